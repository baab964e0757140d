//! 저장소 스냅샷 → Traefik 동적 설정 컴파일러
//!
//! 요청마다 엣지 노드를 확인하고, 라우트 행과 호스트 이름을 각각 한 번씩 읽은 뒤
//! 그룹 단위로 문서를 만듭니다. 그룹 하나의 문제는 해당 그룹만 건너뛰고,
//! 저장소 오류나 시간 초과만 전체 요청을 실패시킵니다.

pub mod backend;
mod error;
pub mod exit_node;
pub mod grouper;
pub mod hostname;
pub mod http;
pub mod raw;
pub mod tls;

pub use error::CompileError;
pub use exit_node::resolve_exit_node;

use std::future::Future;

use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::document::{DocumentBuilder, DynamicConfig};
use crate::settings::{SettingsError, TraefikSettings};
use crate::store::{ResourceStore, RouteQuery, StoreError};
use self::grouper::{attach_hostnames, group_rows, resource_ids};
use self::http::{auth_plugin_config, HttpCompiler};
use self::raw::RawCompiler;

pub struct ConfigCompiler {
    settings: TraefikSettings,
    auth_plugin: Value,
}

impl ConfigCompiler {
    pub fn new(settings: TraefikSettings) -> Result<Self, SettingsError> {
        let api_base_url = settings.auth.api_base_url()?;
        let auth_plugin = auth_plugin_config(&settings, api_base_url.as_str());
        Ok(Self { settings, auth_plugin })
    }

    pub fn settings(&self) -> &TraefikSettings {
        &self.settings
    }

    /// 저장소 읽기에 제한 시간을 적용합니다.
    async fn read<T, F>(&self, operation: &'static str, future: F) -> Result<T, CompileError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let limit = self.settings.read_timeout();
        match timeout(limit, future).await {
            Ok(result) => result.map_err(|source| CompileError::Store { operation, source }),
            Err(_) => Err(CompileError::Timeout { operation, timeout: limit }),
        }
    }

    #[instrument(skip(self, store), level = "debug", err)]
    pub async fn compile(&self, store: &dyn ResourceStore) -> Result<DynamicConfig, CompileError> {
        let nodes = self.read("exit_nodes", store.exit_nodes()).await?;
        let exit_node = resolve_exit_node(&nodes, self.settings.exit_node_name.as_deref());

        let query = RouteQuery {
            exit_node_id: exit_node.as_ref().map(|node| node.exit_node_id),
            site_types: self.settings.site_types.clone(),
            allow_raw_resources: self.settings.allow_raw_resources,
        };
        let rows = self.read("route_rows", store.route_rows(&query)).await?;
        let row_count = rows.len();

        let mut groups = group_rows(rows);
        let ids = resource_ids(&groups);
        let hostnames = self.read("hostnames", store.hostnames(&ids)).await?;
        attach_hostnames(&mut groups, &hostnames);

        let http = HttpCompiler::new(&self.settings, &self.auth_plugin);
        let raw = RawCompiler::new(&self.settings);
        let mut builder = DocumentBuilder::new();
        let mut emitted = 0usize;

        for group in groups.values() {
            let added = if group.resource.protocol.is_http() {
                http.compile(group, &mut builder)
            } else {
                raw.compile(group, &mut builder)
            };
            if added {
                emitted += 1;
            } else {
                debug!(group = %group.key, "그룹 건너뜀");
            }
        }

        info!(
            exit_node_id = ?query.exit_node_id,
            rows = row_count,
            groups = groups.len(),
            emitted = emitted,
            "동적 설정 컴파일 완료"
        );
        Ok(builder.build())
    }
}
