//! 라인 분류 및 디스패치
//!
//! [`AuthLogParser`]는 원시 로그 텍스트에서 `sshd[<pid>]` 마커가 있는 라인을 골라
//! 메시지 유형을 추출하고, 해당 문법으로 파싱한 뒤
//! 타임스탬프 정규화와 세션 ID 계산을 거쳐 [`AuthEvent`]를 만듭니다.
//!
//! 라인 단위 실패는 로그만 남기고 건너뜁니다.
//! 호출 전체가 실패하는 경우는 `log_year`가 허용 범위를 벗어났을 때뿐입니다.

use chrono::{DateTime, Datelike, Utc};
use metrics::counter;
use regex::Regex;
use tracing::{debug, error, info, warn};

use sshtrail_core::config::is_valid_log_year;
use sshtrail_core::error::ParseError;
use sshtrail_core::metrics as m;
use sshtrail_core::types::{AuthEvent, AuthResult, EventTable, EventType};

use crate::error::AuthLogError;
use crate::grammar::{self, GrammarError, MessageKind, SshdLine};
use crate::session::SessionKey;
use crate::timestamp;

/// sshd 마커 패턴
const MARKER_PATTERN: &str = r"sshd\[\d+\]";

/// 마커 뒤 두 토큰 중 첫 번째가 메시지 유형
const MESSAGE_TYPE_PATTERN: &str = r".*sshd\[\d+\]:\s+(\S+)\s+(\S+)\s";

/// 호출 한 번의 처리 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// 마커가 있는 라인 수
    pub marker_lines: u64,
    /// 생성된 이벤트 수
    pub events: u64,
    /// 메시지 유형을 추출하지 못한 라인 수
    pub skipped_no_message_type: u64,
    /// 모델링하지 않는 메시지 유형 라인 수
    pub skipped_unknown_type: u64,
    /// 알려진 유형이지만 문법에 맞지 않는 라인 수
    pub skipped_malformed: u64,
    /// 타임스탬프 정규화에 실패한 라인 수
    pub skipped_timestamp: u64,
}

impl ParseStats {
    /// 건너뛴 라인 합계
    pub fn skipped(&self) -> u64 {
        self.skipped_no_message_type
            + self.skipped_unknown_type
            + self.skipped_malformed
            + self.skipped_timestamp
    }
}

/// 마커 라인 하나의 처리 결과
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// 이벤트 생성
    Event(Box<AuthEvent>),
    /// 메시지 유형 추출 실패
    NoMessageType,
    /// 모델링하지 않는 메시지 유형
    UnknownType(String),
    /// 문법 불일치
    Malformed {
        kind: MessageKind,
        error: GrammarError,
    },
    /// 타임스탬프 정규화 실패
    BadTimestamp(String),
}

/// sshd 인증 로그 파서
///
/// 정규식은 생성 시 한 번 컴파일되며 이후 불변입니다.
/// 여러 워커에서 공유할 때는 `Arc`로 감쌉니다.
#[derive(Debug, Clone)]
pub struct AuthLogParser {
    marker: Regex,
    message_type: Regex,
}

impl AuthLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, AuthLogError> {
        Ok(Self {
            marker: Regex::new(MARKER_PATTERN)?,
            message_type: Regex::new(MESSAGE_TYPE_PATTERN)?,
        })
    }

    /// 라인에 sshd 마커가 있는지 확인합니다.
    pub fn is_sshd_line(&self, line: &str) -> bool {
        self.marker.is_match(line)
    }

    /// 마커 뒤의 메시지 유형 토큰을 추출합니다.
    pub fn message_type<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.message_type
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// 로그 텍스트 전체를 파싱합니다.
    ///
    /// `log_year`가 없으면 현재 연도를 사용하고 warn 로그를 남깁니다.
    /// 범위 [1970, 9999]를 벗어나면 어떤 라인도 처리하지 않고 실패합니다.
    pub fn parse_log_data(
        &self,
        text: &str,
        source_label: &str,
        log_year: Option<i32>,
    ) -> Result<EventTable, AuthLogError> {
        self.parse_with_stats(text, source_label, log_year)
            .map(|(table, _)| table)
    }

    /// [`parse_log_data`](Self::parse_log_data)와 같으며 처리 통계를 함께 반환합니다.
    pub fn parse_with_stats(
        &self,
        text: &str,
        source_label: &str,
        log_year: Option<i32>,
    ) -> Result<(EventTable, ParseStats), AuthLogError> {
        let log_year = resolve_log_year(log_year, source_label)?;
        let mut table = EventTable::new();
        let mut stats = ParseStats::default();

        for (idx, line) in text.lines().enumerate() {
            if !self.is_sshd_line(line) {
                continue;
            }
            stats.marker_lines += 1;
            let line_no = idx + 1;

            match self.parse_line(line, log_year) {
                LineOutcome::Event(event) => {
                    counter!(m::AUTH_LOG_EVENTS_PARSED_TOTAL, m::LABEL_MESSAGE_TYPE => event_label(&event))
                        .increment(1);
                    stats.events += 1;
                    table.push(*event);
                }
                LineOutcome::NoMessageType => {
                    debug!(source = %source_label, line_no, "unable to extract message type");
                    stats.skipped_no_message_type += 1;
                }
                LineOutcome::UnknownType(message_type) => {
                    debug!(source = %source_label, line_no, message_type = %message_type, "unsupported sshd message type");
                    stats.skipped_unknown_type += 1;
                }
                LineOutcome::Malformed { kind, error } => {
                    let error = ParseError::from(error);
                    debug!(source = %source_label, line_no, message_type = %kind, error = %error, "sshd line does not match grammar");
                    stats.skipped_malformed += 1;
                }
                LineOutcome::BadTimestamp(reason) => {
                    error!(source = %source_label, line_no, error = %reason, "error extracting date/time");
                    stats.skipped_timestamp += 1;
                }
            }
        }

        record_skips(&stats);
        counter!(m::AUTH_LOG_MARKER_LINES_TOTAL).increment(stats.marker_lines);
        info!(
            source = %source_label,
            marker_lines = stats.marker_lines,
            events = stats.events,
            skipped = stats.skipped(),
            "parsed sshd auth log"
        );

        Ok((table, stats))
    }

    /// 마커 라인 하나를 처리합니다.
    ///
    /// `log_year`는 이미 검증된 값이어야 합니다.
    pub fn parse_line(&self, line: &str, log_year: i32) -> LineOutcome {
        let Some(message_type) = self.message_type(line) else {
            return LineOutcome::NoMessageType;
        };
        let Some(kind) = MessageKind::from_message_type(message_type) else {
            return LineOutcome::UnknownType(message_type.to_owned());
        };

        let parsed = match grammar::parse_line(kind, line) {
            Ok(parsed) => parsed,
            Err(error) => return LineOutcome::Malformed { kind, error },
        };

        match timestamp::normalize(&parsed.datetime, log_year) {
            Ok(datetime) => LineOutcome::Event(Box::new(build_event(&parsed, &datetime))),
            Err(e) => LineOutcome::BadTimestamp(e.to_string()),
        }
    }
}

/// `log_year`를 확정합니다.
pub fn resolve_log_year(log_year: Option<i32>, source_label: &str) -> Result<i32, AuthLogError> {
    match log_year {
        Some(year) if is_valid_log_year(year) => Ok(year),
        Some(year) => Err(AuthLogError::LogYearOutOfRange {
            year,
            source_label: source_label.to_owned(),
        }),
        None => {
            let year = Utc::now().year();
            warn!(source = %source_label, year, "log year not provided, assuming current year");
            Ok(year)
        }
    }
}

/// 파싱된 라인과 정규화된 시각으로 이벤트를 만듭니다.
fn build_event(line: &SshdLine<'_>, datetime: &DateTime<Utc>) -> AuthEvent {
    let date = datetime.format("%Y-%m-%d").to_string();
    let message = &line.message;
    let session_id = SessionKey {
        date: &date,
        hostname: line.hostname,
        username: message.username(),
        source_ip: message.source_ip(),
        source_port: message.source_port_text(),
    }
    .session_id();

    AuthEvent {
        timestamp: timestamp::epoch_seconds(datetime),
        time: datetime.format("%H:%M:%S").to_string(),
        date,
        hostname: line.hostname.to_owned(),
        pid: line.pid,
        event_type: message.event_type(),
        auth_method: message.auth_method(),
        auth_result: message.auth_result(),
        username: message.username().to_owned(),
        domain: String::new(),
        source_ip: message.source_ip().to_owned(),
        source_port: message.source_port(),
        source_hostname: String::new(),
        session_id,
    }
}

fn event_label(event: &AuthEvent) -> &'static str {
    match (event.event_type, event.auth_result) {
        (EventType::Disconnection, _) => MessageKind::Disconnected.key(),
        (_, AuthResult::Success) => MessageKind::Accepted.key(),
        _ => MessageKind::Failed.key(),
    }
}

fn record_skips(stats: &ParseStats) {
    for (reason, count) in [
        ("no_message_type", stats.skipped_no_message_type),
        ("unknown_type", stats.skipped_unknown_type),
        ("grammar", stats.skipped_malformed),
        ("timestamp", stats.skipped_timestamp),
    ] {
        if count > 0 {
            counter!(m::AUTH_LOG_LINES_SKIPPED_TOTAL, m::LABEL_REASON => reason).increment(count);
        }
    }
}
