//! 로그 파일 수집
//!
//! 호출자가 넘긴 [`InputFile`] 목록에서 접두어가 맞는 파일만 골라
//! 읽고(`.gz`면 압축 해제), ISO-8859-1로 디코딩한 뒤 파서에 넘깁니다.
//!
//! 파일 하나를 읽지 못하면 에러 로그를 남기고 다음 파일로 넘어갑니다.
//! 결과 테이블은 입력 파일 순서, 파일 안에서는 라인 순서를 따릅니다.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use metrics::counter;
use tracing::{debug, error, info, warn};

use sshtrail_core::error::IngestError;
use sshtrail_core::metrics as m;
use sshtrail_core::types::EventTable;

use crate::config::AnalyzerConfig;
use crate::error::AuthLogError;
use crate::parser::AuthLogParser;

/// gzip 파일 확장자
const GZIP_SUFFIX: &str = ".gz";

/// 분석할 입력 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// 접두어 선택과 로그에 쓰이는 이름 (예: `auth.log.2.gz`)
    pub display_name: String,
    /// 실제 파일 경로
    pub path: PathBuf,
}

impl InputFile {
    pub fn new(display_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
        }
    }

    /// 경로의 파일명을 표시 이름으로 사용합니다.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { display_name, path }
    }

    /// 표시 이름이 `.gz`로 끝나는지 여부
    pub fn is_gzip(&self) -> bool {
        self.display_name.ends_with(GZIP_SUFFIX)
    }
}

/// 디스크에서 읽은 원시 로그
#[derive(Debug, Clone)]
pub struct RawLog {
    /// 압축 해제된 바이트
    pub data: Bytes,
    /// 소스 이름 (표시 이름)
    pub source: String,
}

impl RawLog {
    pub fn new(data: Bytes, source: impl Into<String>) -> Self {
        Self {
            data,
            source: source.into(),
        }
    }

    /// ISO-8859-1로 디코딩합니다. 실패하지 않습니다.
    pub fn text(&self) -> String {
        decode_latin1(&self.data)
    }
}

/// 각 바이트를 같은 값의 코드 포인트로 매핑합니다.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// 파일 하나를 읽어 [`RawLog`]를 만듭니다.
///
/// 크기 제한은 디스크상 크기와 압축 해제 후 크기에 각각 적용됩니다.
pub fn read_raw_log(file: &InputFile, config: &AnalyzerConfig) -> Result<RawLog, AuthLogError> {
    let path_str = file.path.display().to_string();

    let metadata = fs::metadata(&file.path).map_err(|e| IngestError::FileAccess {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    if metadata.len() > config.max_file_size {
        return Err(IngestError::TooLarge {
            path: path_str,
            size: metadata.len(),
            max: config.max_file_size,
        }
        .into());
    }

    let data = fs::read(&file.path).map_err(|e| IngestError::FileAccess {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let data = if file.is_gzip() {
        decompress_gzip(&data, &path_str, config.max_decompressed_size)?
    } else {
        data
    };

    Ok(RawLog::new(Bytes::from(data), file.display_name.clone()))
}

/// gzip 데이터를 최대 `max` 바이트까지 압축 해제합니다.
fn decompress_gzip(data: &[u8], path: &str, max: u64) -> Result<Vec<u8>, AuthLogError> {
    let mut out = Vec::new();
    MultiGzDecoder::new(data)
        .take(max.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| IngestError::Decompress {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

    let size = out.len() as u64;
    if size > max {
        return Err(IngestError::TooLarge {
            path: path.to_owned(),
            size,
            max,
        }
        .into());
    }

    Ok(out)
}

/// 파일 하나를 읽고 파싱합니다.
///
/// 파일 수준 실패는 로그를 남기고 빈 테이블을 반환합니다.
/// 설정 수준 실패만 에러로 전파됩니다.
fn ingest_file(
    parser: &AuthLogParser,
    config: &AnalyzerConfig,
    file: &InputFile,
) -> Result<EventTable, AuthLogError> {
    let raw = match read_raw_log(file, config) {
        Ok(raw) => raw,
        Err(AuthLogError::Ingest(e @ IngestError::TooLarge { .. })) => {
            warn!(source = %file.display_name, error = %e, "log file too large, skipping");
            counter!(m::AUTH_LOG_FILES_FAILED_TOTAL).increment(1);
            return Ok(EventTable::new());
        }
        Err(e) if !e.is_fatal() => {
            error!(source = %file.display_name, path = %file.path.display(), error = %e, "unable to read log file, skipping");
            counter!(m::AUTH_LOG_FILES_FAILED_TOTAL).increment(1);
            return Ok(EventTable::new());
        }
        Err(e) => return Err(e),
    };

    debug!(source = %raw.source, bytes = raw.data.len(), "read log file");
    let table = parser.parse_log_data(&raw.text(), &raw.source, config.log_year)?;
    counter!(m::AUTH_LOG_FILES_PROCESSED_TOTAL).increment(1);
    info!(source = %raw.source, events = table.len(), "processed auth log file");
    Ok(table)
}

/// 인증 로그 수집기
///
/// 파서는 한 번 생성되어 모든 파일(과 워커)에서 공유됩니다.
pub struct LogIngestor {
    parser: Arc<AuthLogParser>,
    config: AnalyzerConfig,
}

impl LogIngestor {
    /// 설정을 검증하고 수집기를 생성합니다.
    ///
    /// 허용 범위를 벗어난 `log_year`는 여기서 거부되므로
    /// 파일을 하나도 열기 전에 실패합니다.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AuthLogError> {
        config.validate()?;
        Ok(Self {
            parser: Arc::new(AuthLogParser::new()?),
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn parser(&self) -> &AuthLogParser {
        &self.parser
    }

    /// 표시 이름이 설정된 접두어 중 하나로 시작하는지 확인합니다.
    pub fn is_selected(&self, file: &InputFile) -> bool {
        self.config
            .file_prefixes
            .iter()
            .any(|prefix| file.display_name.starts_with(prefix.as_str()))
    }

    fn select<'f>(&self, files: &'f [InputFile]) -> Vec<&'f InputFile> {
        files
            .iter()
            .filter(|file| {
                let selected = self.is_selected(file);
                if !selected {
                    debug!(source = %file.display_name, "not an auth log file, skipping");
                }
                selected
            })
            .collect()
    }

    /// 파일을 입력 순서대로 하나씩 처리합니다.
    pub fn read_logs(&self, files: &[InputFile]) -> Result<EventTable, AuthLogError> {
        if !self.config.enabled {
            info!("auth log analysis disabled");
            return Ok(EventTable::new());
        }

        let selected = self.select(files);
        if selected.is_empty() {
            info!(files = files.len(), "no SSH authentication log files to process");
            return Ok(EventTable::new());
        }

        let mut table = EventTable::new();
        for file in selected {
            table.extend(ingest_file(&self.parser, &self.config, file)?);
        }

        info!(events = table.len(), "total SSH authentication events");
        Ok(table)
    }

    /// 파일마다 blocking 워커를 띄워 병렬로 처리합니다.
    ///
    /// 모든 워커가 끝난 뒤 입력 순서대로 이어 붙이므로
    /// 결과는 [`read_logs`](Self::read_logs)와 같습니다.
    pub async fn read_logs_concurrent(
        &self,
        files: &[InputFile],
    ) -> Result<EventTable, AuthLogError> {
        if !self.config.enabled {
            info!("auth log analysis disabled");
            return Ok(EventTable::new());
        }

        let selected = self.select(files);
        if selected.is_empty() {
            info!(files = files.len(), "no SSH authentication log files to process");
            return Ok(EventTable::new());
        }

        let mut handles = Vec::with_capacity(selected.len());
        for file in selected {
            let parser = Arc::clone(&self.parser);
            let config = self.config.clone();
            let file = file.clone();
            let name = file.display_name.clone();
            let handle =
                tokio::task::spawn_blocking(move || ingest_file(&parser, &config, &file));
            handles.push((name, handle));
        }

        let mut table = EventTable::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(partial) => table.extend(partial?),
                Err(e) => {
                    error!(source = %name, error = %e, "auth log worker failed, skipping file");
                    counter!(m::AUTH_LOG_FILES_FAILED_TOTAL).increment(1);
                }
            }
        }

        info!(events = table.len(), "total SSH authentication events");
        Ok(table)
    }
}

/// 디렉토리의 파일을 이름순으로 [`InputFile`] 목록으로 만듭니다.
///
/// 하위 디렉토리는 탐색하지 않습니다. 읽을 수 없는 항목은 건너뜁니다.
pub fn discover_input_files(dir: &Path) -> Result<Vec<InputFile>, AuthLogError> {
    let entries = fs::read_dir(dir).map_err(|e| IngestError::FileAccess {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() {
            files.push(InputFile::from_path(path));
        }
    }

    files.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(files)
}
