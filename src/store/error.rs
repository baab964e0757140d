use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// 저장소에 연결할 수 없음
    Unavailable {
        reason: String,
    },
    /// 스냅샷 파일 읽기 실패
    FileError {
        path: String,
        error: std::io::Error,
    },
    /// 스냅샷 파싱 실패
    ParseError {
        path: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } =>
                write!(f, "저장소 사용 불가: {}", reason),
            Self::FileError { path, error } =>
                write!(f, "스냅샷 파일 {} 읽기 실패: {}", path, error),
            Self::ParseError { path, source } =>
                write!(f, "스냅샷 파일 {} 파싱 실패: {}", path, source),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileError { error, .. } => Some(error),
            Self::ParseError { source, .. } => Some(source),
            Self::Unavailable { .. } => None,
        }
    }
}
