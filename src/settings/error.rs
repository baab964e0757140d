use std::fmt;
use std::path::PathBuf;

/// 설정 로드, 검증, 로깅 초기화 단계의 오류
#[derive(Debug)]
pub enum SettingsError {
    EnvVarInvalid {
        var_name: String,
        value: String,
        reason: String,
    },
    FileError {
        path: PathBuf,
        error: std::io::Error,
    },
    ParseError {
        source: toml::de::Error,
    },
    /// 내부 호스트와 포트로 인증 API 주소를 만들 수 없음
    InvalidAuthUrl {
        base: String,
        source: url::ParseError,
    },
    LogFile {
        path: PathBuf,
    },
    LoggingInit {
        reason: String,
    },
    InvalidConfig(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVarInvalid { var_name, value, reason } =>
                write!(f, "환경 변수 {} 값 {} 오류: {}", var_name, value, reason),
            Self::FileError { path, error } =>
                write!(f, "설정 파일 {} 오류: {}", path.display(), error),
            Self::ParseError { source } =>
                write!(f, "설정 파싱 오류: {}", source),
            Self::InvalidAuthUrl { base, source } =>
                write!(f, "인증 미들웨어 API 주소 {} 오류: {}", base, source),
            Self::LogFile { path } =>
                write!(f, "로그 파일 경로 오류: {}", path.display()),
            Self::LoggingInit { reason } =>
                write!(f, "로깅 초기화 실패: {}", reason),
            Self::InvalidConfig(reason) =>
                write!(f, "잘못된 설정: {}", reason),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError { source } => Some(source),
            Self::FileError { error, .. } => Some(error),
            Self::InvalidAuthUrl { source, .. } => Some(source),
            _ => None,
        }
    }
}
