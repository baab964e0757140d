use std::sync::Arc;

use tracing::{error, info};

use traefik_config_compiler::{
    compiler::ConfigCompiler,
    logging::init_logging,
    server::{Error, RequestHandler, ServerListener, TRAEFIK_CONFIG_PATH},
    settings::Settings,
    store::{FileSnapshotStore, ResourceStore},
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("서버 실행 실패: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let settings = Settings::load().await?;
    let _log_guard = init_logging(&settings.logging)?;

    let store: Arc<dyn ResourceStore> = Arc::new(FileSnapshotStore::new(settings.store.snapshot_path.clone()));
    let compiler = Arc::new(ConfigCompiler::new(settings.traefik.clone())?);
    let handler = Arc::new(RequestHandler::new(compiler, store));

    let listener = ServerListener::bind(&settings.server).await?;
    info!(
        address = %listener.local_addr()?,
        path = TRAEFIK_CONFIG_PATH,
        snapshot = %settings.store.snapshot_path.display(),
        exit_node = ?settings.traefik.exit_node_name,
        "설정 컴파일러 시작"
    );

    tokio::select! {
        result = listener.run(handler) => {
            if let Err(e) = &result {
                error!(error = %e, "리스너 종료");
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("종료 신호 수신");
            Ok(())
        }
    }
}
