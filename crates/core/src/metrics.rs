//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더(exporter) 설치는 라이브러리를 사용하는 쪽의 책임입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sshtrail_`
//! - 모듈명: `auth_log_`, `analysis_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sshtrail_core::metrics::AUTH_LOG_EVENTS_PARSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 메시지 유형 레이블 키 (accepted, failed, disconnected)
pub const LABEL_MESSAGE_TYPE: &str = "message_type";

/// 건너뛴 사유 레이블 키 (no_message_type, unknown_type, grammar, timestamp)
pub const LABEL_REASON: &str = "reason";

/// 탐지기 이름 레이블 키
pub const LABEL_DETECTOR: &str = "detector";

// ─── Auth Log 메트릭 ────────────────────────────────────────────────

/// Auth Log: sshd 마커가 있는 라인 수 (counter)
pub const AUTH_LOG_MARKER_LINES_TOTAL: &str = "sshtrail_auth_log_marker_lines_total";

/// Auth Log: 생성된 이벤트 수 (counter, label: message_type)
pub const AUTH_LOG_EVENTS_PARSED_TOTAL: &str = "sshtrail_auth_log_events_parsed_total";

/// Auth Log: 건너뛴 라인 수 (counter, label: reason)
pub const AUTH_LOG_LINES_SKIPPED_TOTAL: &str = "sshtrail_auth_log_lines_skipped_total";

/// Auth Log: 처리한 파일 수 (counter)
pub const AUTH_LOG_FILES_PROCESSED_TOTAL: &str = "sshtrail_auth_log_files_processed_total";

/// Auth Log: 읽기/압축 해제에 실패한 파일 수 (counter)
pub const AUTH_LOG_FILES_FAILED_TOTAL: &str = "sshtrail_auth_log_files_failed_total";

// ─── Analysis 메트릭 ────────────────────────────────────────────────

/// Analysis: 탐지기 실행 수 (counter, label: detector)
pub const ANALYSIS_DETECTOR_RUNS_TOTAL: &str = "sshtrail_analysis_detector_runs_total";

/// Analysis: 탐지기 실패 수 (counter, label: detector)
pub const ANALYSIS_DETECTOR_FAILURES_TOTAL: &str = "sshtrail_analysis_detector_failures_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        AUTH_LOG_MARKER_LINES_TOTAL,
        "Total number of log lines carrying the sshd[pid] marker"
    );
    describe_counter!(
        AUTH_LOG_EVENTS_PARSED_TOTAL,
        "Total number of authentication events produced, by message type"
    );
    describe_counter!(
        AUTH_LOG_LINES_SKIPPED_TOTAL,
        "Total number of sshd lines skipped, by reason"
    );
    describe_counter!(
        AUTH_LOG_FILES_PROCESSED_TOTAL,
        "Total number of log files parsed"
    );
    describe_counter!(
        AUTH_LOG_FILES_FAILED_TOTAL,
        "Total number of log files skipped because they could not be read"
    );
    describe_counter!(
        ANALYSIS_DETECTOR_RUNS_TOTAL,
        "Total number of detector invocations"
    );
    describe_counter!(
        ANALYSIS_DETECTOR_FAILURES_TOTAL,
        "Total number of detector invocations that returned an error"
    );
}
