//! 통합 테스트 -- 파일 수집부터 분석 보고서까지의 전체 흐름 검증

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use sshtrail_auth_log::{
    AnalysisRunner, AnalyzerConfig, AnalyzerConfigBuilder, AuthLogError, AuthLogParser,
    InputFile, LogIngestor,
};
use sshtrail_core::config::AuthLogConfig;
use sshtrail_core::error::SshtrailError;
use sshtrail_core::pipeline::{DetectionResult, Detector};
use sshtrail_core::types::{AuthMethod, AuthResult, EventTable, EventType, Priority};

/// Accepted 3, Failed 4, Disconnected 2 + 잡음
const FIXTURE: &str = "\
Feb  8 13:30:01 web-01 CRON[812]: pam_unix(cron:session): session opened for user root by (uid=0)
Feb  8 13:30:44 web-01 sshd[1234]: Connection from 192.168.1.100 port 52311 on 10.0.0.2 port 22
Feb  8 13:30:45 web-01 sshd[1234]: Accepted password for root from 192.168.1.100 port 52311 ssh2
Feb  8 13:30:45 web-01 sshd[1234]: pam_unix(sshd:session): session opened for user root by (uid=0)
Feb  8 13:31:02 web-01 sshd[1240]: Failed password for invalid user admin from 203.0.113.7 port 41000 ssh2
Feb  8 13:31:04 web-01 sshd[1240]: Failed password for invalid user admin from 203.0.113.7 port 41000 ssh2
Feb  8 13:31:06 web-01 sshd[1240]: Connection closed by invalid user admin 203.0.113.7 port 41000 [preauth]
Feb  8 13:31:10 web-01 sshd[1251]: Failed publickey for git from 198.51.100.2 port 2222 ssh2
Feb  8 13:31:11 web-01 sshd[1251]: Failed password for root from 198.51.100.2 port 2223 ssh2 [preauth]
Feb  8 13:31:12 web-01 sshd[1252]: Failed none for invalid user guest from 198.51.100.2 port 2224 ssh2
Feb  8 13:32:00 web-01 sshd[1260]: Accepted publickey for deploy from 10.0.0.5 port 40022 ssh2: RSA SHA256:Xc3GZoGm0yGnH2yT4pDkHn1lKxR0yAwhQ1y1oP7lX9s
Feb  8 13:32:01 web-01 sshd[1261]: Accepted keyboard-interactive/pam for ops from 10.0.0.6 port 40023 ssh2

Feb  8 13:40:00 web-01 sshd[1270]: Disconnected from 198.51.100.2 port 2222 [preauth]
Feb  8 13:45:00 web-01 sshd[1234]: Disconnected from user root 192.168.1.100 port 52311
Feb  8 13:50:00 web-01 sshd[1260]: Disconnected from user deploy 10.0.0.5 port 40022
2023-02-08T14:00:00.500000+01:00 web-01 sshd[1300]: Accepted password for backup from 10.0.0.9 port 50000 ssh2
Feb  8 14:10:00 web-01 kernel: [12345.678] eth0: link up
";

const ACCEPTED: usize = 3;
const FAILED: usize = 4;
const DISCONNECTED: usize = 2;

fn config() -> AnalyzerConfig {
    AnalyzerConfigBuilder::new().log_year(2023).build().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn write(dir: &Path, name: &str, data: &[u8]) -> InputFile {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    InputFile::from_path(path)
}

/// 파서 단독: N+M+K 이벤트와 필드 매핑
#[test]
fn test_fixture_event_counts_and_mapping() {
    let parser = AuthLogParser::new().unwrap();
    let table = parser
        .parse_log_data(FIXTURE, "auth.log", Some(2023))
        .unwrap();

    assert_eq!(table.len(), ACCEPTED + FAILED + DISCONNECTED);
    assert_eq!(
        table.count(EventType::Authentication, AuthResult::Success),
        ACCEPTED
    );
    assert_eq!(
        table.count(EventType::Authentication, AuthResult::Failure),
        FAILED
    );
    assert_eq!(
        table.count(EventType::Disconnection, AuthResult::Unspecified),
        DISCONNECTED
    );

    for event in &table {
        match event.event_type {
            EventType::Authentication => {
                assert_ne!(event.auth_method, AuthMethod::Unspecified);
                assert_ne!(event.auth_result, AuthResult::Unspecified);
            }
            EventType::Disconnection => {
                assert_eq!(event.auth_method, AuthMethod::Unspecified);
                assert_eq!(event.auth_result, AuthResult::Unspecified);
            }
            EventType::Unknown => panic!("unknown event type produced"),
        }
        assert_eq!(event.hostname, "web-01");
        assert!(event.domain.is_empty());
        assert!(event.source_hostname.is_empty());
        assert_eq!(event.session_id.len(), 64);
    }

    // 라인 순서 유지
    let users: Vec<&str> = table.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(
        users,
        vec![
            "root", "admin", "admin", "git", "root", "deploy", "root", "deploy", "backup"
        ]
    );

    // ISO 타임스탬프는 오프셋을 반영해 UTC로
    let last = table.events().last().unwrap();
    assert_eq!(last.date, "2023-02-08");
    assert_eq!(last.time, "13:00:00");
    assert_eq!(last.timestamp, 1_675_861_200.5);
}

/// 로그인과 종료가 같은 날이면 같은 세션 ID
#[test]
fn test_session_correlation() {
    let table = AuthLogParser::new()
        .unwrap()
        .parse_log_data(FIXTURE, "auth.log", Some(2023))
        .unwrap();

    let deploy: Vec<_> = table.iter().filter(|e| e.username == "deploy").collect();
    assert_eq!(deploy.len(), 2);
    assert_eq!(deploy[0].session_id, deploy[1].session_id);

    let admin: Vec<_> = table.iter().filter(|e| e.username == "admin").collect();
    assert_ne!(admin[0].session_id, deploy[0].session_id);
}

/// 평문과 gzip 파일은 같은 결과
#[test]
fn test_gzip_and_plain_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write(dir.path(), "auth.log", FIXTURE.as_bytes());
    let packed = write(dir.path(), "auth.log.1.gz", &gzip(FIXTURE.as_bytes()));

    let ingestor = LogIngestor::new(config()).unwrap();
    let a = ingestor.read_logs(&[plain]).unwrap();
    let b = ingestor.read_logs(&[packed]).unwrap();

    assert_eq!(a.len(), ACCEPTED + FAILED + DISCONNECTED);
    assert_eq!(a, b);
}

/// 여러 파일은 입력 순서대로 이어 붙임
#[test]
fn test_multiple_files_keep_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let second = FIXTURE.replace("web-01", "web-02");
    let files = [
        write(dir.path(), "secure", FIXTURE.as_bytes()),
        write(dir.path(), "unrelated.log", FIXTURE.as_bytes()),
        write(dir.path(), "secure.1.gz", &gzip(second.as_bytes())),
    ];

    let table = LogIngestor::new(config()).unwrap().read_logs(&files).unwrap();
    let total = ACCEPTED + FAILED + DISCONNECTED;
    assert_eq!(table.len(), total * 2);
    assert!(table.events()[..total].iter().all(|e| e.hostname == "web-01"));
    assert!(table.events()[total..].iter().all(|e| e.hostname == "web-02"));
}

/// Latin-1 바이트는 디코딩 실패 없이 처리되지만, 출력 불가능한 필드를 가진 라인은 건너뜀
#[test]
fn test_latin1_bytes_do_not_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = b"Feb  8 15:00:00 web-01 sshd[1400]: Failed password for jos\xe9 from 10.0.0.7 port 50001 ssh2\n".to_vec();
    data.extend_from_slice(FIXTURE.as_bytes());
    data.extend_from_slice(
        b"Feb  8 15:00:01 web-01 sshd[1401]: Failed password for a\x01b from 10.0.0.7 port 50002 ssh2\n",
    );
    data.extend_from_slice(
        b"Feb  8 15:00:02 web-01 sshd[1402]: Failed password for jose from 10.0.0.7 port 50003 ssh2\n",
    );
    let file = write(dir.path(), "auth.log", &data);

    let table = LogIngestor::new(config()).unwrap().read_logs(&[file]).unwrap();
    assert_eq!(table.len(), ACCEPTED + FAILED + DISCONNECTED + 1);
    assert!(table.iter().all(|e| e.username.bytes().all(|b| b.is_ascii_graphic())));
    assert_eq!(table.events().last().unwrap().username, "jose");
}

/// 빈 입력은 에러가 아닌 빈 테이블
#[test]
fn test_empty_inputs() {
    let ingestor = LogIngestor::new(config()).unwrap();
    assert!(ingestor.read_logs(&[]).unwrap().is_empty());

    let dir = tempfile::tempdir().unwrap();
    let files = [
        write(dir.path(), "syslog", FIXTURE.as_bytes()),
        write(dir.path(), "auth.log", b""),
    ];
    assert!(ingestor.read_logs(&files).unwrap().is_empty());
}

/// 범위를 벗어난 연도는 어떤 라인도 처리하기 전에 실패
#[test]
fn test_log_year_out_of_range_fails_fast() {
    let parser = AuthLogParser::new().unwrap();
    for year in [1969, 10_000] {
        let err = parser
            .parse_log_data(FIXTURE, "auth.log", Some(year))
            .unwrap_err();
        assert!(matches!(err, AuthLogError::LogYearOutOfRange { .. }));

        let top: SshtrailError = err.into();
        assert!(matches!(top, SshtrailError::Config(_)));
    }

    let core = AuthLogConfig {
        log_year: Some(10_000),
        ..AuthLogConfig::default()
    };
    assert!(LogIngestor::new(AnalyzerConfig::from_core(&core)).is_err());
}

/// 경계 연도는 허용
#[test]
fn test_log_year_bounds_accepted() {
    let parser = AuthLogParser::new().unwrap();
    for year in [1970, 9999] {
        let table = parser
            .parse_log_data(FIXTURE, "auth.log", Some(year))
            .unwrap();
        assert!(table.events()[0].date.starts_with(&year.to_string()));
    }
}

/// 병렬 수집은 순차 수집과 같은 결과
#[tokio::test]
async fn test_concurrent_ingest_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();
    for i in 0..6 {
        let body = FIXTURE.replace("web-01", &format!("node-{i}"));
        let file = if i % 2 == 0 {
            write(dir.path(), &format!("auth.log.{i}"), body.as_bytes())
        } else {
            write(dir.path(), &format!("auth.log.{i}.gz"), &gzip(body.as_bytes()))
        };
        files.push(file);
    }
    files.push(InputFile::new("auth.log.missing", dir.path().join("nope")));

    let ingestor = LogIngestor::new(config()).unwrap();
    let sequential = ingestor.read_logs(&files).unwrap();
    let concurrent = ingestor.read_logs_concurrent(&files).await.unwrap();

    assert_eq!(sequential.len(), 6 * (ACCEPTED + FAILED + DISCONNECTED));
    assert_eq!(sequential, concurrent);
}

/// JSON lines 내보내기
#[test]
fn test_json_lines_export() {
    let table = AuthLogParser::new()
        .unwrap()
        .parse_log_data(FIXTURE, "auth.log", Some(2023))
        .unwrap();

    let mut out = Vec::new();
    table.write_json_lines(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), table.len());

    let first: serde_json::Value = serde_json::from_str(rows[0]).unwrap();
    let keys: Vec<&str> = first
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    for column in EventTable::column_names() {
        assert!(keys.contains(column), "missing column {column}");
    }
}

// --- 탐지기 테스트 더블 ---

/// 실패 횟수가 임계치 이상이면 HIGH
struct FailureThreshold {
    threshold: usize,
}

impl Detector for FailureThreshold {
    fn name(&self) -> &str {
        "failure_threshold"
    }

    fn analyze(&self, events: &EventTable) -> Result<Option<DetectionResult>, SshtrailError> {
        let failures = events.count(EventType::Authentication, AuthResult::Failure);
        if failures < self.threshold {
            return Ok(None);
        }
        Ok(Some(DetectionResult::new(
            "HIGH",
            format!("{failures} failed logins"),
            format!("##### Brute force analysis\n\n- {failures} failed logins"),
        )))
    }
}

/// 알 수 없는 우선순위를 보고
struct OddLabel;

impl Detector for OddLabel {
    fn name(&self) -> &str {
        "odd_label"
    }

    fn analyze(&self, _events: &EventTable) -> Result<Option<DetectionResult>, SshtrailError> {
        Ok(Some(DetectionResult::new("URGENT", "odd", "odd report")))
    }
}

/// 파일 수집 → 분석 보고서
#[test]
fn test_ingest_then_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "secure", FIXTURE.as_bytes());
    let events = LogIngestor::new(config()).unwrap().read_logs(&[file]).unwrap();

    let runner = AnalysisRunner::new()
        .register(Box::new(FailureThreshold { threshold: 3 }))
        .register(Box::new(OddLabel));
    let report = runner.run(&events, "web-01");

    assert_eq!(report.priority, Priority::High);
    assert_eq!(report.outcomes[1].priority, Priority::Low);
    assert_eq!(report.summary, "4 failed logins. odd");
    assert_eq!(
        report.report,
        "##### Brute force analysis\n\n- 4 failed logins\nodd report"
    );
}

/// 발견 사항 없음 → 고정 문구
#[test]
fn test_analyze_without_findings() {
    let events = AuthLogParser::new()
        .unwrap()
        .parse_log_data(FIXTURE, "auth.log", Some(2023))
        .unwrap();

    let runner = AnalysisRunner::new().register(Box::new(FailureThreshold { threshold: 100 }));
    let report = runner.run(&events, "web-01");

    assert_eq!(report.priority, Priority::Low);
    assert_eq!(report.summary, "No findings for brute force analysis");
    assert_eq!(report.report, "##### Brute force analysis\n\n- No findings");
}
