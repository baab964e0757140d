use std::path::Path;
use std::time::Instant;

use time::format_description::well_known::Rfc3339;
use tracing::{error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LogOutput, LogSettings, SettingsError};

/// 전역 subscriber를 설정합니다.
///
/// 반환된 guard가 drop되면 남은 로그가 flush되므로 프로세스가 끝날 때까지 유지해야 합니다.
pub fn init_logging(settings: &LogSettings) -> Result<WorkerGuard, SettingsError> {
    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let directory = path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name()
                .ok_or_else(|| SettingsError::LogFile { path: path.clone() })?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_target(true)
        .with_writer(writer);

    let result = match settings.format {
        LogFormat::Text => builder.with_ansi(matches!(settings.output, LogOutput::Stdout)).try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };

    result.map_err(|e| SettingsError::LoggingInit { reason: e.to_string() })?;
    Ok(guard)
}

/// API 요청 하나의 처리 기록
#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub error: Option<String>,
    started: Instant,
}

impl RequestLog {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            status_code: 0,
            error: None,
            started: Instant::now(),
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn with_error(&mut self, error: impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }

    pub fn duration_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

pub fn log_request(log: &RequestLog) {
    let level = if log.error.is_some() {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    match level {
        Level::ERROR => error!(
            request_id = %log.request_id,
            method = %log.method,
            path = %log.path,
            status = log.status_code,
            duration_ms = log.duration_ms() as u64,
            error = ?log.error,
            "요청 처리 실패"
        ),
        Level::WARN => warn!(
            request_id = %log.request_id,
            method = %log.method,
            path = %log.path,
            status = log.status_code,
            duration_ms = log.duration_ms() as u64,
            "요청 거부"
        ),
        _ => info!(
            request_id = %log.request_id,
            method = %log.method,
            path = %log.path,
            status = log.status_code,
            duration_ms = log.duration_ms() as u64,
            "요청 처리 완료"
        ),
    }
}
