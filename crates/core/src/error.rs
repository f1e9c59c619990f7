//! 에러 타입: 도메인별 에러 정의

/// sshtrail 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SshtrailError {
    /// 설정 관련 에러 (log_year 범위 위반 포함)
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 라인 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 파일 수집 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// 탐지기 에러
    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 라인 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 문법 불일치
    #[error("grammar '{grammar}' did not match: {reason}")]
    Grammar { grammar: String, reason: String },

    /// 타임스탬프 정규화 실패
    #[error("invalid timestamp '{raw}': {reason}")]
    Timestamp { raw: String, reason: String },
}

/// 파일 수집 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 파일 접근 실패 (없음, 권한 등)
    #[error("cannot read {path}: {reason}")]
    FileAccess { path: String, reason: String },

    /// 압축 해제 실패
    #[error("cannot decompress {path}: {reason}")]
    Decompress { path: String, reason: String },

    /// 크기 제한 초과
    #[error("{path} too large: {size} bytes (max: {max})")]
    TooLarge { path: String, size: u64, max: u64 },
}

/// 탐지기 에러
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// 분석기 실행 실패
    #[error("analyzer '{name}' failed: {reason}")]
    Analyzer { name: String, reason: String },
}
