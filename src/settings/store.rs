use serde::Deserialize;
use std::path::PathBuf;
use super::{server::parse_env_var, SettingsError};

/// 리소스 스냅샷 위치
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreSettings {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl StoreSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            snapshot_path: parse_env_var("PROXY_SNAPSHOT_PATH", default_snapshot_path)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PROXY_SNAPSHOT_PATH".to_string(),
                value: String::new(),
                reason: "스냅샷 경로는 비어있을 수 없습니다".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("config/snapshot.json")
}
