//! 타임스탬프 정규화
//!
//! 문법이 캡처한 [`RawDateTime`]을 UTC 시각으로 변환합니다.
//!
//! - syslog 3토큰 형식은 연도가 없으므로 `log_year`를 끼워 넣어
//!   `%b %d %Y %H:%M:%S`로 파싱하고, 타임존 정보가 없으므로 UTC로 간주합니다.
//! - ISO 8601 1토큰 형식은 오프셋을 반영해 UTC로 변환합니다.
//!   오프셋이 없으면 UTC로 간주합니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use tracing::{error, warn};

use sshtrail_core::error::ParseError;

use crate::grammar::RawDateTime;

/// 연도를 끼워 넣은 syslog 타임스탬프 형식
const SYSLOG_FORMAT: &str = "%b %d %Y %H:%M:%S";

type IsoCandidate = fn(&str) -> Option<DateTime<Utc>>;

/// ISO 토큰 후보 파서. 앞에서부터 시도합니다.
const ISO_CANDIDATES: [IsoCandidate; 4] = [
    iso_with_offset,
    iso_naive_t_separator,
    iso_naive_space_separator,
    iso_date_only,
];

/// 원시 날짜/시각을 UTC 시각으로 정규화합니다.
///
/// 윤초(초 필드 `60`)는 거부합니다. `date`/`time`은 항상 epoch 값의 투영이어야 합니다.
pub fn normalize(raw: &RawDateTime<'_>, log_year: i32) -> Result<DateTime<Utc>, ParseError> {
    let datetime = match *raw {
        RawDateTime::Syslog { month, day, time } => {
            let joined = format!("{month} {day} {log_year} {time}");
            NaiveDateTime::parse_from_str(&joined, SYSLOG_FORMAT)
                .map(|naive| naive.and_utc())
                .map_err(|e| ParseError::Timestamp {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                })?
        }
        RawDateTime::Iso(token) => ISO_CANDIDATES
            .iter()
            .find_map(|candidate| candidate(token))
            .ok_or_else(|| ParseError::Timestamp {
                raw: token.to_owned(),
                reason: "not an ISO 8601 timestamp".to_owned(),
            })?,
    };

    if datetime.nanosecond() >= 1_000_000_000 {
        return Err(ParseError::Timestamp {
            raw: raw.to_string(),
            reason: "leap second is not supported".to_owned(),
        });
    }
    Ok(datetime)
}

/// 토큰 목록을 받아 정규화합니다.
///
/// 3토큰은 syslog 형식, 1토큰은 ISO 형식으로 처리합니다.
/// 그 외 토큰 수는 UTC epoch(0)로 대체하고 warn 로그를 남깁니다.
/// 이 값은 실제 이벤트 시각이 아닙니다.
/// 파싱 실패는 `None`입니다.
pub fn normalize_tokens(tokens: &[&str], log_year: i32) -> Option<DateTime<Utc>> {
    let raw = match *tokens {
        [month, day, time] => RawDateTime::Syslog { month, day, time },
        [token] => RawDateTime::Iso(token),
        _ => {
            warn!(
                token_count = tokens.len(),
                "unexpected datetime shape, falling back to unix epoch"
            );
            return Some(DateTime::<Utc>::UNIX_EPOCH);
        }
    };

    match normalize(&raw, log_year) {
        Ok(datetime) => Some(datetime),
        Err(e) => {
            error!(error = %e, "invalid datetime format");
            None
        }
    }
}

/// 초 단위 Unix 타임스탬프 (마이크로초 정밀도)
pub fn epoch_seconds(datetime: &DateTime<Utc>) -> f64 {
    datetime.timestamp() as f64 + f64::from(datetime.timestamp_subsec_micros()) / 1_000_000.0
}

fn iso_with_offset(token: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(token)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn iso_naive_t_separator(token: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn iso_naive_space_separator(token: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(token, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn iso_date_only(token: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
