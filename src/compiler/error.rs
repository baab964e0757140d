use std::fmt;
use std::time::Duration;

use crate::store::StoreError;

/// 컴파일 전체를 중단시키는 오류
///
/// 그룹 단위로 복구 가능한 문제(도메인 누락, 포트 누락 등)는 여기에 오지 않고
/// 해당 그룹만 건너뜁니다.
#[derive(Debug)]
pub enum CompileError {
    /// 저장소 읽기 실패
    Store {
        operation: &'static str,
        source: StoreError,
    },
    /// 저장소 읽기 시간 초과
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Store { operation, source } =>
                write!(f, "저장소 읽기 실패 ({}): {}", operation, source),
            CompileError::Timeout { operation, timeout } =>
                write!(f, "저장소 읽기 시간 초과 ({}): {}ms", operation, timeout.as_millis()),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Store { source, .. } => Some(source),
            CompileError::Timeout { .. } => None,
        }
    }
}
