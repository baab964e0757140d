//! 설정 조회 HTTP API

pub mod error;
pub mod handler;
pub mod listener;

pub use error::Error;
pub use handler::{RequestHandler, TRAEFIK_CONFIG_PATH};
pub use listener::ServerListener;

pub type Result<T> = std::result::Result<T, Error>;
