//! 탐지기 실행 및 보고서 집계
//!
//! [`AnalysisRunner`]는 등록된 [`Detector`]를 이벤트 테이블에 차례로 실행하고
//! 결과를 하나의 [`AnalysisReport`]로 합칩니다.
//!
//! - 발견 사항이 없으면 고정 요약/보고서로 대체합니다.
//! - 알 수 없는 우선순위 레이블은 `Low`로 대체하고 error 로그를 남깁니다.
//! - 탐지기가 에러를 반환하면 `Low`, 빈 요약, 빈 보고서로 취급합니다.
//! - 전체 우선순위는 가장 심각한 탐지기 우선순위입니다.

use metrics::counter;
use serde::Serialize;
use tracing::{error, info};

use sshtrail_core::metrics as m;
use sshtrail_core::pipeline::{DetectionResult, Detector};
use sshtrail_core::types::{EventTable, Priority};

/// 발견 사항이 없을 때의 요약
pub const NO_FINDINGS_SUMMARY: &str = "No findings for brute force analysis";

/// 발견 사항이 없을 때의 보고서
pub const NO_FINDINGS_REPORT: &str = "##### Brute force analysis\n\n- No findings";

/// 등록된 탐지기가 없을 때의 요약
pub const NO_DETECTOR_SUMMARY: &str = "No findings for SSH authentication analyzer.";

/// 등록된 탐지기가 없을 때의 보고서
pub const NO_DETECTOR_REPORT: &str = "No finding for SSH authentication analyzer.";

/// 탐지기 하나의 해석된 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    /// 탐지기 이름
    pub detector: String,
    pub priority: Priority,
    pub summary: String,
    /// 마크다운 보고서
    pub report: String,
}

impl AnalysisOutcome {
    /// 탐지기 원시 결과를 해석합니다.
    pub fn from_detection(detector: &str, result: Option<DetectionResult>) -> Self {
        let Some(result) = result else {
            return Self {
                detector: detector.to_owned(),
                priority: Priority::Low,
                summary: NO_FINDINGS_SUMMARY.to_owned(),
                report: NO_FINDINGS_REPORT.to_owned(),
            };
        };

        Self {
            detector: detector.to_owned(),
            priority: resolve_priority(&result.priority, detector),
            summary: non_empty_or(result.summary, NO_FINDINGS_SUMMARY),
            report: non_empty_or(result.report, NO_FINDINGS_REPORT),
        }
    }

    /// 실패한 탐지기의 결과
    pub fn failed(detector: &str) -> Self {
        Self {
            detector: detector.to_owned(),
            priority: Priority::Low,
            summary: String::new(),
            report: String::new(),
        }
    }
}

/// 집계된 분석 보고서
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// 분석 대상 이름
    pub source: String,
    /// 가장 심각한 우선순위
    pub priority: Priority,
    pub summary: String,
    pub report: String,
    /// 분석한 이벤트 수
    pub event_count: usize,
    /// 탐지기별 결과 (등록 순서)
    pub outcomes: Vec<AnalysisOutcome>,
}

/// 우선순위 레이블을 해석합니다. 알 수 없으면 `Low`입니다.
pub fn resolve_priority(label: &str, detector: &str) -> Priority {
    Priority::from_label(label).unwrap_or_else(|| {
        error!(detector = %detector, priority = %label, "unknown priority label, using LOW");
        Priority::Low
    })
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_owned()
    } else {
        value
    }
}

/// 탐지기 실행기
#[derive(Default)]
pub struct AnalysisRunner {
    detectors: Vec<Box<dyn Detector>>,
}

impl AnalysisRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 탐지기를 등록합니다. 등록 순서대로 실행됩니다.
    pub fn register(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// 등록된 탐지기 이름 목록
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// 탐지기 하나를 실행합니다. 실패해도 결과를 반환합니다.
    pub fn run_detector(&self, detector: &dyn Detector, events: &EventTable) -> AnalysisOutcome {
        let name = detector.name();
        counter!(m::ANALYSIS_DETECTOR_RUNS_TOTAL, m::LABEL_DETECTOR => name.to_owned())
            .increment(1);

        match detector.analyze(events) {
            Ok(result) => AnalysisOutcome::from_detection(name, result),
            Err(e) => {
                error!(detector = %name, error = %e, "detector failed");
                counter!(m::ANALYSIS_DETECTOR_FAILURES_TOTAL, m::LABEL_DETECTOR => name.to_owned())
                    .increment(1);
                AnalysisOutcome::failed(name)
            }
        }
    }

    /// 모든 탐지기를 실행하고 보고서를 집계합니다.
    pub fn run(&self, events: &EventTable, source_label: &str) -> AnalysisReport {
        if events.is_empty() {
            let summary = format!("No SSH authentication events in {source_label}.");
            info!(source = %source_label, "{summary}");
            return AnalysisReport {
                source: source_label.to_owned(),
                priority: Priority::Low,
                summary,
                report: String::new(),
                event_count: 0,
                outcomes: Vec::new(),
            };
        }

        let outcomes: Vec<AnalysisOutcome> = self
            .detectors
            .iter()
            .map(|detector| self.run_detector(detector.as_ref(), events))
            .collect();

        let (summary, report) = if outcomes.is_empty() {
            (
                NO_DETECTOR_SUMMARY.to_owned(),
                NO_DETECTOR_REPORT.to_owned(),
            )
        } else {
            (
                outcomes
                    .iter()
                    .map(|o| o.summary.as_str())
                    .collect::<Vec<_>>()
                    .join(". "),
                outcomes
                    .iter()
                    .map(|o| o.report.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };

        let priority = outcomes
            .iter()
            .map(|o| o.priority)
            .max()
            .unwrap_or(Priority::Low);

        info!(
            source = %source_label,
            events = events.len(),
            detectors = outcomes.len(),
            priority = %priority,
            "SSH authentication analysis complete"
        );

        AnalysisReport {
            source: source_label.to_owned(),
            priority,
            summary,
            report,
            event_count: events.len(),
            outcomes,
        }
    }
}
