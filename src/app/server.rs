use crate::adapters::file::FileStore;
use crate::adapters::http::{build_router, ApiState};
use crate::adapters::memory::MemoryStore;
use crate::config::toml_config::{SeedPlan, ServerConfig, StoreBackend};
use crate::core::instances::InstanceHandler;
use crate::domain::model::Plan;
use crate::domain::ports::ResourceStore;
use crate::utils::error::{StoreError, StoreResult};
use anyhow::Context;
use tokio::net::TcpListener;

/// 依設定選擇儲存後端並啟動 API 伺服器，直到收到關閉訊號
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("⚠️ Using in-memory store; instances are lost on restart");
            serve(MemoryStore::new(), config).await
        }
        StoreBackend::File => {
            tracing::info!("📁 Using file store at {}", config.store.path);
            let store = FileStore::new(config.store.path.clone());
            serve(store, config).await
        }
    }
}

async fn serve<S>(store: S, config: ServerConfig) -> anyhow::Result<()>
where
    S: ResourceStore + Clone + 'static,
{
    let namespace = config.store.namespace.clone();

    let seeded = seed_plans(&store, &namespace, &config.store.seed_plans)
        .await
        .context("failed to seed plans")?;
    if seeded > 0 {
        tracing::info!("🌱 Seeded {} plan(s) into namespace {}", seeded, namespace);
    }

    let handler =
        InstanceHandler::new(store, namespace.as_str()).with_timeout(config.request_timeout());
    let app = build_router(ApiState::new(handler));

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_address))?;
    tracing::info!(
        "🚀 Provisioning API listening on {} (namespace {})",
        listener.local_addr()?,
        namespace
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Provisioning API stopped");
    Ok(())
}

/// Creates missing plans; plans that already exist are left untouched.
/// Returns how many plans were created.
pub async fn seed_plans<S: ResourceStore>(
    store: &S,
    namespace: &str,
    plans: &[SeedPlan],
) -> StoreResult<usize> {
    let mut created = 0;
    for seed in plans {
        let object =
            Plan::new(seed.name.as_str(), namespace, seed.description.as_str()).into_object()?;
        match store.create(object).await {
            Ok(()) => created += 1,
            Err(StoreError::AlreadyExists { .. }) => {
                tracing::debug!("Plan {} already present", seed.name);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(created)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
