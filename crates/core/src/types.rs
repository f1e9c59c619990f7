//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! SSH 인증 이벤트와 이벤트 테이블, 탐지 결과 우선순위를 정의합니다.
//! 파서는 이 타입들을 생성하고, 탐지기는 이 타입들을 소비합니다.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SshtrailError;

/// 탐지 결과 우선순위
///
/// `Ord` 구현으로 비교가 가능합니다 (`Low < Medium < High < Critical`).
/// 알 수 없는 레이블은 가장 낮은 `Low`로 취급합니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    /// 낮은 우선순위 (기본값)
    #[default]
    Low,
    /// 중간 우선순위
    Medium,
    /// 높은 우선순위
    High,
    /// 치명적, 즉시 확인 필요
    Critical,
}

impl Priority {
    /// 레이블 문자열에서 우선순위를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 대문자 레이블을 반환합니다.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// 이벤트 유형
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// 로그인 시도 (성공/실패)
    Authentication,
    /// 사용자 연결 해제
    Disconnection,
    /// 예약됨. 인식된 문법에서는 생성되지 않습니다.
    #[default]
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Disconnection => "disconnection",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증 방식
///
/// 연결 해제 이벤트에는 인증 방식이 없으므로 빈 문자열로 직렬화됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "publickey")]
    PublicKey,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl AuthMethod {
    /// sshd 로그 토큰에서 인증 방식을 파싱합니다. 대소문자를 구분합니다.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "password" => Some(Self::Password),
            "publickey" => Some(Self::PublicKey),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::PublicKey => "publickey",
            Self::Unspecified => "",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthResult {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failure")]
    Failure,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl AuthResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unspecified => "",
        }
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SSH 인증 이벤트
///
/// 인식된 sshd 로그 라인 하나에서 생성됩니다.
/// 필드 선언 순서가 곧 테이블 내보내기의 컬럼 순서입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEvent {
    /// UTC 기준 Unix 타임스탬프 (초, 소수부 허용)
    pub timestamp: f64,
    /// UTC 날짜 (`YYYY-MM-DD`)
    pub date: String,
    /// UTC 시각 (`HH:MM:SS`)
    pub time: String,
    /// 로그를 기록한 호스트명 (원문 그대로)
    pub hostname: String,
    /// sshd 프로세스 ID
    pub pid: u32,
    /// 이벤트 유형
    pub event_type: EventType,
    /// 인증 방식
    pub auth_method: AuthMethod,
    /// 인증 결과
    pub auth_result: AuthResult,
    /// 사용자명
    pub username: String,
    /// 항상 빈 문자열. 도메인을 가진 다른 인증 소스와 스키마를 맞추기 위한 자리입니다.
    pub domain: String,
    /// 출발지 주소 (검증하지 않은 원문)
    pub source_ip: String,
    /// 출발지 포트
    pub source_port: u16,
    /// 항상 빈 문자열 (역방향 DNS 조회용으로 예약)
    pub source_hostname: String,
    /// 의사 세션 ID (SHA-256 hex)
    pub session_id: String,
}

impl AuthEvent {
    /// `timestamp`를 `DateTime<Utc>`로 변환합니다.
    ///
    /// f64 정밀도 한계로 마이크로초 단위까지만 복원합니다.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.floor();
        let micros = ((self.timestamp - secs) * 1_000_000.0).round() as u32;
        let (secs, micros) = if micros >= 1_000_000 {
            (secs as i64 + 1, 0)
        } else {
            (secs as i64, micros)
        };
        DateTime::from_timestamp(secs, micros * 1_000)
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} sshd[{}] {}/{} user={} from {}:{}",
            self.date,
            self.time,
            self.hostname,
            self.pid,
            self.event_type,
            self.auth_result,
            self.username,
            self.source_ip,
            self.source_port,
        )
    }
}

/// 이벤트 테이블 컬럼명 (필드 선언 순서)
const COLUMN_NAMES: [&str; 14] = [
    "timestamp",
    "date",
    "time",
    "hostname",
    "pid",
    "event_type",
    "auth_method",
    "auth_result",
    "username",
    "domain",
    "source_ip",
    "source_port",
    "source_hostname",
    "session_id",
];

/// 순서가 보장되는 인증 이벤트 모음
///
/// 삽입 순서는 입력 파일 순서, 파일 내에서는 라인 순서를 따릅니다.
/// 빈 테이블은 에러가 아닌 유효한 결과입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    events: Vec<AuthEvent>,
}

impl EventTable {
    /// 빈 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 테이블 컬럼명을 반환합니다.
    pub fn column_names() -> &'static [&'static str] {
        &COLUMN_NAMES
    }

    /// 이벤트를 추가합니다.
    pub fn push(&mut self, event: AuthEvent) {
        self.events.push(event);
    }

    /// 다른 테이블의 이벤트를 순서대로 뒤에 붙입니다.
    pub fn extend(&mut self, other: EventTable) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[AuthEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuthEvent> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<AuthEvent> {
        self.events
    }

    /// 첫 이벤트의 날짜를 반환합니다.
    pub fn first_date(&self) -> Option<&str> {
        self.events.first().map(|e| e.date.as_str())
    }

    /// 마지막 이벤트의 날짜를 반환합니다.
    pub fn last_date(&self) -> Option<&str> {
        self.events.last().map(|e| e.date.as_str())
    }

    /// 주어진 유형/결과 조합의 이벤트 수를 셉니다.
    pub fn count(&self, event_type: EventType, auth_result: AuthResult) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type && e.auth_result == auth_result)
            .count()
    }

    /// 이벤트를 한 줄에 하나씩 JSON 객체로 기록합니다.
    ///
    /// 키 순서는 [`column_names`](Self::column_names)와 같습니다.
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<(), SshtrailError> {
        for event in &self.events {
            serde_json::to_writer(&mut writer, event).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<AuthEvent> for EventTable {
    fn from_iter<I: IntoIterator<Item = AuthEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EventTable {
    type Item = &'a AuthEvent;
    type IntoIter = std::slice::Iter<'a, AuthEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl IntoIterator for EventTable {
    type Item = AuthEvent;
    type IntoIter = std::vec::IntoIter<AuthEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
