//! 설정 관리: sshtrail.toml 파싱 및 런타임 설정
//!
//! [`SshtrailConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 호출자가 직접 지정한 값 (최고 우선)
//! 2. 환경변수 (`SSHTRAIL_AUTH_LOG_LOG_YEAR=2022` 형식)
//! 3. 설정 파일 (`sshtrail.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sshtrail_core::error::SshtrailError> {
//! use sshtrail_core::config::SshtrailConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SshtrailConfig::load("sshtrail.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SshtrailConfig::parse("[auth_log]\nlog_year = 2022")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SshtrailError};

/// 지원하는 최소 로그 연도
pub const MIN_LOG_YEAR: i32 = 1970;

/// 지원하는 최대 로그 연도
pub const MAX_LOG_YEAR: i32 = 9999;

/// `log_year`가 지원 범위 안에 있는지 확인합니다.
pub fn is_valid_log_year(year: i32) -> bool {
    (MIN_LOG_YEAR..=MAX_LOG_YEAR).contains(&year)
}

/// sshtrail 통합 설정
///
/// `sshtrail.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshtrailConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// SSH 인증 로그 분석 설정
    #[serde(default)]
    pub auth_log: AuthLogConfig,
}

impl SshtrailConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SshtrailError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SshtrailError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SshtrailError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SshtrailError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SshtrailError> {
        toml::from_str(toml_str).map_err(|e| {
            SshtrailError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SSHTRAIL_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SSHTRAIL_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SSHTRAIL_GENERAL_LOG_FORMAT");

        // Auth Log
        override_bool(&mut self.auth_log.enabled, "SSHTRAIL_AUTH_LOG_ENABLED");
        override_opt_i32(&mut self.auth_log.log_year, "SSHTRAIL_AUTH_LOG_LOG_YEAR");
        override_csv(
            &mut self.auth_log.file_prefixes,
            "SSHTRAIL_AUTH_LOG_FILE_PREFIXES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SshtrailError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if let Some(year) = self.auth_log.log_year
            && !is_valid_log_year(year)
        {
            return Err(ConfigError::InvalidValue {
                field: "auth_log.log_year".to_owned(),
                reason: format!("{year} is outside {MIN_LOG_YEAR}-{MAX_LOG_YEAR}"),
            }
            .into());
        }

        if self.auth_log.enabled && self.auth_log.file_prefixes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth_log.file_prefixes".to_owned(),
                reason: "at least one prefix must be configured when enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// SSH 인증 로그 분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthLogConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 연도가 없는 syslog 타임스탬프에 적용할 연도. 없으면 현재 연도를 가정합니다.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_year: Option<i32>,
    /// 처리할 파일명 접두어 (예: auth.log, secure)
    pub file_prefixes: Vec<String>,
}

impl Default for AuthLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_year: None,
            file_prefixes: vec![
                "auth.log".to_owned(),
                "secure".to_owned(),
                "message".to_owned(),
            ],
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_opt_i32(target: &mut Option<i32>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.trim().parse::<i32>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i32 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
