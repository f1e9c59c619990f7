//! 의사 세션 ID
//!
//! 로그인 시도와 그 연결 종료를 묶기 위한 상관 키입니다.
//! `date|hostname|username|source_ip|source_port`의 SHA-256 hex 다이제스트이며,
//! 프로토콜상의 실제 세션 토큰이 아닙니다.
//!
//! 키에 전체 시각이 아닌 날짜만 들어가므로 자정을 넘긴 세션은
//! 시작과 종료의 ID가 서로 다릅니다.

use sha2::{Digest, Sha256};

/// 필드 구분자
const FIELD_SEPARATOR: &str = "|";

/// 세션 ID를 구성하는 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionKey<'a> {
    /// UTC 날짜 (`YYYY-MM-DD`)
    pub date: &'a str,
    pub hostname: &'a str,
    pub username: &'a str,
    pub source_ip: &'a str,
    /// 로그에 적힌 그대로의 포트 토큰
    pub source_port: &'a str,
}

impl SessionKey<'_> {
    /// 64자 소문자 hex 다이제스트를 계산합니다.
    pub fn session_id(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, field) in [
            self.date,
            self.hostname,
            self.username,
            self.source_ip,
            self.source_port,
        ]
        .into_iter()
        .enumerate()
        {
            if i > 0 {
                hasher.update(FIELD_SEPARATOR.as_bytes());
            }
            hasher.update(field.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
