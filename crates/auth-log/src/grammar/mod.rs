//! sshd 인증 라인 문법
//!
//! 세 가지 라인 형태를 인식합니다:
//!
//! ```text
//! <datetime> <host> sshd[<pid>]: Accepted <method> for <user> from <ip> port <port> <proto> [<fp_type> <fp>]
//! <datetime> <host> sshd[<pid>]: Failed <method> for [invalid user] <user> from <ip> port <port> <proto> ...
//! <datetime> <host> sshd[<pid>]: Disconnected from user <user> <ip> port <port> ...
//! ```
//!
//! `<datetime>`은 syslog 3토큰 형식(`Feb 8 13:30:45`) 또는 ISO 8601 1토큰 형식
//! (`2023-02-08T13:30:45.123456+11:00`)이며, 3토큰 형식을 먼저 시도합니다.
//! 키워드는 대소문자를 구분합니다.

mod cursor;

use std::fmt;

use sshtrail_core::error::ParseError;
use sshtrail_core::types::{AuthMethod, AuthResult, EventType};

pub use cursor::{GrammarError, TokenCursor, is_printable, tokenize};

/// syslog 월 토큰 최대 길이
const MONTH_MAX_LEN: usize = 3;
/// syslog 일 토큰 최대 자릿수
const DAY_MAX_LEN: usize = 2;
/// syslog 시각 토큰 최대 길이
const TIME_MAX_LEN: usize = 9;
/// 포트 최대 자릿수
const PORT_MAX_LEN: usize = 5;
/// PID 최대 자릿수 (u32 범위는 별도 확인)
const PID_MAX_LEN: usize = 10;

/// 메시지 유형 (문법 키)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Accepted,
    Failed,
    Disconnected,
}

impl MessageKind {
    /// 등록된 모든 문법 키
    pub const ALL: [MessageKind; 3] = [Self::Accepted, Self::Failed, Self::Disconnected];

    /// 소문자 문법 키
    pub fn key(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Failed => "failed",
            Self::Disconnected => "disconnected",
        }
    }

    /// 라인에 나타나는 키워드 (대소문자 구분)
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Failed => "Failed",
            Self::Disconnected => "Disconnected",
        }
    }

    /// 메시지 유형 토큰에서 문법을 찾습니다 (대소문자 무시).
    pub fn from_message_type(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 문법이 캡처한 원시 날짜/시각
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDateTime<'a> {
    /// 연도 없는 syslog 형식: `Feb 8 13:30:45`
    Syslog {
        month: &'a str,
        day: &'a str,
        time: &'a str,
    },
    /// 오프셋을 포함하는 ISO 8601 토큰
    Iso(&'a str),
}

impl<'a> RawDateTime<'a> {
    /// 캡처한 토큰 목록
    pub fn tokens(&self) -> Vec<&'a str> {
        match *self {
            Self::Syslog { month, day, time } => vec![month, day, time],
            Self::Iso(token) => vec![token],
        }
    }
}

impl fmt::Display for RawDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syslog { month, day, time } => write!(f, "{month} {day} {time}"),
            Self::Iso(token) => f.write_str(token),
        }
    }
}

/// 공개키 지문 절
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint<'a> {
    /// 키 유형 (RSA, ED25519 등)
    pub key_type: &'a str,
    /// 지문 (SHA256:...)
    pub digest: &'a str,
}

/// 원본 토큰과 그 값을 함께 가진 포트
///
/// 세션 ID는 로그에 적힌 그대로의 토큰(`02222`)으로 계산합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePort<'a> {
    pub text: &'a str,
    pub value: u16,
}

impl<'a> SourcePort<'a> {
    pub fn new(text: &'a str, value: u16) -> Self {
        Self { text, value }
    }
}

/// sshd 메시지 본문
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SshdMessage<'a> {
    Accepted {
        method: AuthMethod,
        username: &'a str,
        source_ip: &'a str,
        source_port: SourcePort<'a>,
        protocol: &'a str,
        fingerprint: Option<Fingerprint<'a>>,
    },
    Failed {
        method: AuthMethod,
        invalid_user: bool,
        username: &'a str,
        source_ip: &'a str,
        source_port: SourcePort<'a>,
        protocol: &'a str,
    },
    Disconnected {
        username: &'a str,
        source_ip: &'a str,
        source_port: SourcePort<'a>,
    },
}

impl<'a> SshdMessage<'a> {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Accepted { .. } => MessageKind::Accepted,
            Self::Failed { .. } => MessageKind::Failed,
            Self::Disconnected { .. } => MessageKind::Disconnected,
        }
    }

    pub fn username(&self) -> &'a str {
        match *self {
            Self::Accepted { username, .. }
            | Self::Failed { username, .. }
            | Self::Disconnected { username, .. } => username,
        }
    }

    pub fn source_ip(&self) -> &'a str {
        match *self {
            Self::Accepted { source_ip, .. }
            | Self::Failed { source_ip, .. }
            | Self::Disconnected { source_ip, .. } => source_ip,
        }
    }

    pub fn source_port(&self) -> u16 {
        self.port().value
    }

    /// 로그에 적힌 그대로의 포트 토큰
    pub fn source_port_text(&self) -> &'a str {
        self.port().text
    }

    fn port(&self) -> SourcePort<'a> {
        match *self {
            Self::Accepted { source_port, .. }
            | Self::Failed { source_port, .. }
            | Self::Disconnected { source_port, .. } => source_port,
        }
    }

    /// 연결 종료 메시지는 인증 방식이 없습니다.
    pub fn auth_method(&self) -> AuthMethod {
        match *self {
            Self::Accepted { method, .. } | Self::Failed { method, .. } => method,
            Self::Disconnected { .. } => AuthMethod::Unspecified,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Self::Accepted { .. } | Self::Failed { .. } => EventType::Authentication,
            Self::Disconnected { .. } => EventType::Disconnection,
        }
    }

    pub fn auth_result(&self) -> AuthResult {
        match self {
            Self::Accepted { .. } => AuthResult::Success,
            Self::Failed { .. } => AuthResult::Failure,
            Self::Disconnected { .. } => AuthResult::Unspecified,
        }
    }
}

/// 문법이 인식한 sshd 라인 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SshdLine<'a> {
    pub datetime: RawDateTime<'a>,
    pub hostname: &'a str,
    pub pid: u32,
    pub message: SshdMessage<'a>,
}

type DateTimeForm = for<'t, 'a> fn(&mut TokenCursor<'t, 'a>) -> Result<RawDateTime<'a>, GrammarError>;

/// 날짜/시각 후보 형식. 앞에서부터 시도합니다.
const DATETIME_FORMS: [DateTimeForm; 2] = [syslog_datetime, iso_datetime];

/// 주어진 문법으로 라인을 파싱합니다.
///
/// 모든 날짜/시각 후보가 실패하면 가장 멀리 진행한 후보의 에러를 반환합니다.
pub fn parse_line(kind: MessageKind, line: &str) -> Result<SshdLine<'_>, GrammarError> {
    let tokens = tokenize(line);
    let mut furthest: Option<GrammarError> = None;

    for form in DATETIME_FORMS {
        let mut cursor = TokenCursor::new(&tokens);
        let attempt = form(&mut cursor).and_then(|datetime| line_body(kind, datetime, &mut cursor));
        match attempt {
            Ok(parsed) => return Ok(parsed),
            Err(e) => {
                if furthest.as_ref().is_none_or(|f| e.position > f.position) {
                    furthest = Some(e);
                }
            }
        }
    }

    Err(furthest.unwrap_or_else(|| TokenCursor::new(&tokens).error("datetime")))
}

/// 날짜/시각 이후 공통 접두부와 메시지 본문
fn line_body<'a>(
    kind: MessageKind,
    datetime: RawDateTime<'a>,
    cursor: &mut TokenCursor<'_, 'a>,
) -> Result<SshdLine<'a>, GrammarError> {
    let hostname = cursor.word("hostname")?;
    let pid = sshd_tag(cursor)?;
    cursor.literal(kind.keyword())?;

    let message = match kind {
        MessageKind::Accepted => accepted(cursor)?,
        MessageKind::Failed => failed(cursor)?,
        MessageKind::Disconnected => disconnected(cursor)?,
    };

    Ok(SshdLine {
        datetime,
        hostname,
        pid,
        message,
    })
}

fn accepted<'a>(cursor: &mut TokenCursor<'_, 'a>) -> Result<SshdMessage<'a>, GrammarError> {
    let method = auth_method(cursor)?;
    cursor.literal("for")?;
    let username = cursor.word("username")?;
    cursor.literal("from")?;
    let source_ip = cursor.word("source ip")?;
    cursor.literal("port")?;
    let source_port = port(cursor)?;
    let protocol = cursor.word("protocol")?;
    let fingerprint = cursor.optional(|c| {
        let key_type = c.token_where("fingerprint type", |t| {
            t.chars().all(|ch| ch.is_ascii_alphanumeric())
        })?;
        let digest = c.word("fingerprint")?;
        Ok(Fingerprint { key_type, digest })
    });
    cursor.end()?;

    Ok(SshdMessage::Accepted {
        method,
        username,
        source_ip,
        source_port,
        protocol,
        fingerprint,
    })
}

fn failed<'a>(cursor: &mut TokenCursor<'_, 'a>) -> Result<SshdMessage<'a>, GrammarError> {
    let method = auth_method(cursor)?;
    cursor.literal("for")?;
    let invalid_user = cursor
        .optional(|c| {
            c.literal("invalid")?;
            c.literal("user")
        })
        .is_some();
    let username = cursor.word("username")?;
    cursor.literal("from")?;
    let source_ip = cursor.word("source ip")?;
    cursor.literal("port")?;
    let source_port = port(cursor)?;
    let protocol = cursor.word("protocol")?;

    Ok(SshdMessage::Failed {
        method,
        invalid_user,
        username,
        source_ip,
        source_port,
        protocol,
    })
}

fn disconnected<'a>(cursor: &mut TokenCursor<'_, 'a>) -> Result<SshdMessage<'a>, GrammarError> {
    cursor.literal("from")?;
    cursor.literal("user")?;
    let username = cursor.word("username")?;
    let source_ip = cursor.word("source ip")?;
    cursor.literal("port")?;
    let source_port = port(cursor)?;

    Ok(SshdMessage::Disconnected {
        username,
        source_ip,
        source_port,
    })
}

/// `Feb 8 13:30:45`
fn syslog_datetime<'a>(cursor: &mut TokenCursor<'_, 'a>) -> Result<RawDateTime<'a>, GrammarError> {
    let month = cursor.token_where("month", |t| {
        !t.is_empty() && t.len() <= MONTH_MAX_LEN && t.bytes().all(|b| b.is_ascii_alphabetic())
    })?;
    let day = cursor.digits("day", DAY_MAX_LEN)?;
    let time = cursor.token_where("time", |t| is_printable(t) && t.len() <= TIME_MAX_LEN)?;
    Ok(RawDateTime::Syslog { month, day, time })
}

/// `2023-02-08T13:30:45.123456+11:00`
fn iso_datetime<'a>(cursor: &mut TokenCursor<'_, 'a>) -> Result<RawDateTime<'a>, GrammarError> {
    cursor.word("datetime").map(RawDateTime::Iso)
}

/// `sshd[1234]:` 토큰에서 PID를 추출합니다.
fn sshd_tag(cursor: &mut TokenCursor<'_, '_>) -> Result<u32, GrammarError> {
    let expected = "'sshd[<pid>]:'";
    let tag = cursor.token_where(expected, |t| pid_digits(t).is_some())?;
    pid_digits(tag)
        .and_then(|digits| digits.parse::<u32>().ok())
        .ok_or_else(|| GrammarError {
            position: cursor.position() - 1,
            expected: "pid within u32 range".to_owned(),
            found: Some(tag.to_owned()),
        })
}

fn pid_digits(token: &str) -> Option<&str> {
    let digits = token.strip_prefix("sshd[")?.strip_suffix("]:")?;
    (!digits.is_empty()
        && digits.len() <= PID_MAX_LEN
        && digits.bytes().all(|b| b.is_ascii_digit()))
    .then_some(digits)
}

fn auth_method(cursor: &mut TokenCursor<'_, '_>) -> Result<AuthMethod, GrammarError> {
    let token = cursor.token_where("'password' or 'publickey'", |t| {
        AuthMethod::from_token(t).is_some()
    })?;
    AuthMethod::from_token(token).ok_or_else(|| cursor.error("'password' or 'publickey'"))
}

fn port<'a>(cursor: &mut TokenCursor<'_, 'a>) -> Result<SourcePort<'a>, GrammarError> {
    let digits = cursor.digits("port", PORT_MAX_LEN)?;
    digits
        .parse::<u16>()
        .map(|value| SourcePort::new(digits, value))
        .map_err(|_| GrammarError {
            position: cursor.position() - 1,
            expected: "port within 0-65535".to_owned(),
            found: Some(digits.to_owned()),
        })
}

impl From<GrammarError> for ParseError {
    fn from(err: GrammarError) -> Self {
        ParseError::Grammar {
            grammar: "sshd".to_owned(),
            reason: err.to_string(),
        }
    }
}
