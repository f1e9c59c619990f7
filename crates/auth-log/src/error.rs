//! 인증 로그 엔진 에러 타입
//!
//! [`AuthLogError`]는 엔진이 호출자에게 돌려주는 에러입니다.
//! 라인 단위 실패는 여기까지 올라오지 않고 디스패처 안에서 로그로 남습니다.
//! `From<AuthLogError> for SshtrailError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use sshtrail_core::error::{ConfigError, IngestError, SshtrailError};

/// 인증 로그 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AuthLogError {
    /// 허용 범위를 벗어난 로그 연도 (파일 전체 처리 중단)
    #[error("log year {year} is outside of acceptable range [1970, 9999] in {source_label}")]
    LogYearOutOfRange {
        /// 전달된 연도
        year: i32,
        /// 처리 중이던 소스 이름
        source_label: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 수집 에러 (파일 단위로 복구됨)
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl AuthLogError {
    /// 호출 전체를 중단해야 하는 설정 수준 에러인지 여부
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LogYearOutOfRange { .. } | Self::Config { .. } | Self::Regex(_)
        )
    }
}

impl From<AuthLogError> for SshtrailError {
    fn from(err: AuthLogError) -> Self {
        match err {
            AuthLogError::LogYearOutOfRange { year, source_label } => {
                SshtrailError::Config(ConfigError::InvalidValue {
                    field: "auth_log.log_year".to_owned(),
                    reason: format!(
                        "{year} is outside of acceptable range [1970, 9999] in {source_label}"
                    ),
                })
            }
            AuthLogError::Config { field, reason } => {
                SshtrailError::Config(ConfigError::InvalidValue { field, reason })
            }
            AuthLogError::Ingest(e) => SshtrailError::Ingest(e),
            AuthLogError::Regex(e) => SshtrailError::Config(ConfigError::InvalidValue {
                field: "auth_log.patterns".to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}
