use tracing::{debug, warn};

use crate::model::ExitNode;

/// 설정 문서를 요청한 엣지 노드를 결정합니다.
///
/// 이름이 설정되어 있으면 이름으로 찾고, 없으면 첫 번째 노드를 씁니다.
/// 찾지 못하면 `None`이며, 이때는 엣지 노드가 지정되지 않은 사이트만 포함됩니다.
pub fn resolve_exit_node(nodes: &[ExitNode], configured_name: Option<&str>) -> Option<ExitNode> {
    let resolved = match configured_name {
        Some(name) => nodes.iter().find(|node| node.name == name),
        None => nodes.first(),
    };

    match resolved {
        Some(node) => {
            debug!(exit_node_id = node.exit_node_id, name = %node.name, "엣지 노드 확인");
            Some(node.clone())
        }
        None => {
            warn!(
                configured_name = ?configured_name,
                known_nodes = nodes.len(),
                "엣지 노드를 찾을 수 없음, 미지정 사이트만 포함"
            );
            None
        }
    }
}
