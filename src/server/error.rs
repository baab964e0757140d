use std::fmt;

use crate::compiler::CompileError;
use crate::settings::SettingsError;

#[derive(Debug)]
pub enum Error {
    Settings(SettingsError),
    Io(std::io::Error),
    Compile(CompileError),
    Serialize(serde_json::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<SettingsError> for Error {
    fn from(err: SettingsError) -> Self {
        Error::Settings(err)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Settings(e) => write!(f, "설정 오류: {}", e),
            Error::Io(e) => write!(f, "IO 오류: {}", e),
            Error::Compile(e) => write!(f, "컴파일 오류: {}", e),
            Error::Serialize(e) => write!(f, "직렬화 오류: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Settings(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Compile(e) => Some(e),
            Error::Serialize(e) => Some(e),
        }
    }
}
