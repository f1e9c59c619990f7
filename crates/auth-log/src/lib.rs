#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`grammar`]: sshd 인증 라인 문법 (Accepted / Failed / Disconnected)
//! - [`timestamp`]: syslog/ISO 타임스탬프의 UTC 정규화
//! - [`session`]: 의사 세션 ID 계산
//! - [`parser`]: 마커 라인 분류, 메시지 유형 디스패치, 이벤트 생성
//! - [`ingest`]: 파일 선택, gzip 해제, ISO-8859-1 디코딩, 순차/병렬 수집
//! - [`analysis`]: 탐지기 실행과 보고서 집계
//! - [`config`]: 분석기 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! InputFile -> LogIngestor -> AuthLogParser -> grammar -> timestamp -> session -> EventTable -> AnalysisRunner
//!                 |                |                                                              |
//!            gzip/latin1      sshd[pid] marker                                               Detector trait
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod grammar;
pub mod ingest;
pub mod parser;
pub mod session;
pub mod timestamp;

// --- 주요 타입 re-export ---

// 파서
pub use parser::{AuthLogParser, LineOutcome, ParseStats};

// 문법
pub use grammar::{MessageKind, RawDateTime, SourcePort, SshdLine, SshdMessage};

// 수집기
pub use ingest::{InputFile, LogIngestor, RawLog};

// 분석
pub use analysis::{AnalysisOutcome, AnalysisReport, AnalysisRunner};

// 설정
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};

// 에러
pub use error::AuthLogError;
