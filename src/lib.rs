//! Library application: the author and book resource API.

pub mod modules;

use anyhow::Context;
use library_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build the registry with every application module, assembled from `settings`.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings).context("failed to register modules")?;
    Ok(registry)
}

/// Initialize and start every module, serve HTTP until shutdown, then stop.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = library_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
