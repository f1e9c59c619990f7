//! 탐지기 trait: 분석 확장 포인트 정의
//!
//! 무차별 대입 탐지 등 실제 분석 알고리즘은 이 크레이트 밖에 있습니다.
//! 분석기는 [`Detector`]를 구현하고, 엔진은 결과 레이블을 [`Priority`](crate::types::Priority)로
//! 해석합니다.

use serde::{Deserialize, Serialize};

use crate::error::SshtrailError;
use crate::types::EventTable;

/// 탐지기가 반환하는 원시 결과
///
/// `priority`는 탐지기가 보고한 레이블 그대로이며 (`"HIGH"` 등),
/// 인식할 수 없는 값일 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// 우선순위 레이블
    pub priority: String,
    /// 한 줄 요약
    pub summary: String,
    /// 마크다운 상세 보고서
    pub report: String,
}

impl DetectionResult {
    pub fn new(
        priority: impl Into<String>,
        summary: impl Into<String>,
        report: impl Into<String>,
    ) -> Self {
        Self {
            priority: priority.into(),
            summary: summary.into(),
            report: report.into(),
        }
    }
}

/// 이벤트 테이블을 분석하는 탐지기 trait
///
/// 새로운 분석기를 추가하려면 이 trait을 구현합니다.
/// 발견 사항이 없으면 `Ok(None)`을 반환합니다.
pub trait Detector: Send + Sync {
    /// 탐지기 이름
    fn name(&self) -> &str;

    /// 이벤트 테이블을 분석합니다.
    fn analyze(&self, events: &EventTable) -> Result<Option<DetectionResult>, SshtrailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDetector;

    impl Detector for CountingDetector {
        fn name(&self) -> &str {
            "counting"
        }

        fn analyze(&self, events: &EventTable) -> Result<Option<DetectionResult>, SshtrailError> {
            if events.is_empty() {
                return Ok(None);
            }
            Ok(Some(DetectionResult::new(
                "LOW",
                format!("{} events", events.len()),
                String::new(),
            )))
        }
    }

    #[test]
    fn detector_is_object_safe() {
        let detector: Box<dyn Detector> = Box::new(CountingDetector);
        assert_eq!(detector.name(), "counting");
        assert!(detector.analyze(&EventTable::new()).unwrap().is_none());
    }

    #[test]
    fn detection_result_new() {
        let result = DetectionResult::new("HIGH", "summary", "##### report");
        assert_eq!(result.priority, "HIGH");
        assert_eq!(result.summary, "summary");
        assert_eq!(result.report, "##### report");
    }
}
