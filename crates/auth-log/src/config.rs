//! 분석기 설정
//!
//! [`AnalyzerConfig`]는 core의 [`AuthLogConfig`](sshtrail_core::config::AuthLogConfig)를
//! 기반으로 엔진 전용 크기 제한을 더한 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use sshtrail_core::config::SshtrailConfig;
//! use sshtrail_auth_log::config::AnalyzerConfig;
//!
//! let core_config = SshtrailConfig::default();
//! let config = AnalyzerConfig::from_core(&core_config.auth_log);
//! ```

use serde::{Deserialize, Serialize};

use sshtrail_core::config::{AuthLogConfig, is_valid_log_year};

use crate::error::AuthLogError;

/// 기본 최대 파일 크기 (512 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// 기본 최대 압축 해제 크기 (2 GiB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// 인증 로그 분석기 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// syslog 타임스탬프에 적용할 연도 (없으면 현재 연도)
    pub log_year: Option<i32>,
    /// 처리할 파일명 접두어
    pub file_prefixes: Vec<String>,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 디스크상 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// gzip 압축 해제 후 최대 크기 (바이트)
    pub max_decompressed_size: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::from_core(&AuthLogConfig::default())
    }
}

impl AnalyzerConfig {
    /// core의 `AuthLogConfig`에서 분석기 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &AuthLogConfig) -> Self {
        Self {
            enabled: core.enabled,
            log_year: core.log_year,
            file_prefixes: core.file_prefixes.clone(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AuthLogError> {
        if let Some(year) = self.log_year
            && !is_valid_log_year(year)
        {
            return Err(AuthLogError::Config {
                field: "log_year".to_owned(),
                reason: format!("{year} is outside of acceptable range [1970, 9999]"),
            });
        }

        if self.enabled && self.file_prefixes.is_empty() {
            return Err(AuthLogError::Config {
                field: "file_prefixes".to_owned(),
                reason: "at least one prefix must be configured when enabled".to_owned(),
            });
        }

        if self.file_prefixes.iter().any(|p| p.is_empty()) {
            return Err(AuthLogError::Config {
                field: "file_prefixes".to_owned(),
                reason: "prefix must not be empty".to_owned(),
            });
        }

        if self.max_file_size == 0 {
            return Err(AuthLogError::Config {
                field: "max_file_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_decompressed_size == 0 {
            return Err(AuthLogError::Config {
                field: "max_decompressed_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 분석기 설정 빌더
#[derive(Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성화 여부를 설정합니다.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// 로그 연도를 설정합니다.
    pub fn log_year(mut self, year: i32) -> Self {
        self.config.log_year = Some(year);
        self
    }

    /// 파일명 접두어를 설정합니다.
    pub fn file_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.config.file_prefixes = prefixes;
        self
    }

    /// 최대 파일 크기를 설정합니다.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// 최대 압축 해제 크기를 설정합니다.
    pub fn max_decompressed_size(mut self, bytes: u64) -> Self {
        self.config.max_decompressed_size = bytes;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<AnalyzerConfig, AuthLogError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AnalyzerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.log_year, None);
        assert_eq!(config.file_prefixes, vec!["auth.log", "secure", "message"]);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn from_core_copies_shared_fields() {
        let core = AuthLogConfig {
            enabled: false,
            log_year: Some(2021),
            file_prefixes: vec!["secure".to_owned()],
        };
        let config = AnalyzerConfig::from_core(&core);
        assert!(!config.enabled);
        assert_eq!(config.log_year, Some(2021));
        assert_eq!(config.file_prefixes, vec!["secure"]);
        assert_eq!(config.max_decompressed_size, DEFAULT_MAX_DECOMPRESSED_SIZE);
    }

    #[test]
    fn builder_sets_fields() {
        let config = AnalyzerConfigBuilder::new()
            .log_year(2023)
            .file_prefixes(vec!["auth.log".to_owned()])
            .max_file_size(1024)
            .max_decompressed_size(4096)
            .build()
            .unwrap();
        assert_eq!(config.log_year, Some(2023));
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.max_decompressed_size, 4096);
    }

    #[test]
    fn log_year_bounds_are_inclusive() {
        for year in [1970, 9999] {
            assert!(AnalyzerConfigBuilder::new().log_year(year).build().is_ok());
        }
        for year in [0, 1969, 10000, -1] {
            let err = AnalyzerConfigBuilder::new().log_year(year).build().unwrap_err();
            assert!(err.to_string().contains("log_year"));
        }
    }

    #[test]
    fn empty_prefixes_rejected_when_enabled() {
        assert!(
            AnalyzerConfigBuilder::new()
                .file_prefixes(vec![])
                .build()
                .is_err()
        );
        assert!(
            AnalyzerConfigBuilder::new()
                .enabled(false)
                .file_prefixes(vec![])
                .build()
                .is_ok()
        );
        assert!(
            AnalyzerConfigBuilder::new()
                .file_prefixes(vec![String::new()])
                .build()
                .is_err()
        );
    }

    #[test]
    fn zero_limits_rejected() {
        assert!(AnalyzerConfigBuilder::new().max_file_size(0).build().is_err());
        assert!(
            AnalyzerConfigBuilder::new()
                .max_decompressed_size(0)
                .build()
                .is_err()
        );
    }
}
