//! Startup wiring: settings → store → modules → HTTP server.
//!
//! Any failure here is fatal; callers propagate it out of `main`.

use std::sync::Arc;

use anyhow::{bail, Context};
use shelf_kernel::settings::{DatabaseBackend, Settings};
use shelf_kernel::{InitCtx, ModuleRegistry};

use crate::modules::{
    self,
    books::{
        handlers::SharedStore,
        store::{MemoryBookStore, PgBookStore},
    },
};

/// Build the registry around an already constructed store.
pub fn registry_with_store(store: SharedStore) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

/// Open the configured store and, for Postgres, bring its schema up to date.
pub async fn prepare(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    match settings.database.backend {
        DatabaseBackend::Postgres => {
            let pool = shelf_db::connect(&settings.database)
                .await
                .context("could not load the database")?;
            let registry = registry_with_store(Arc::new(PgBookStore::new(pool.clone())));

            shelf_db::migrate(&pool, &registry.collect_migrations())
                .await
                .context("could not migrate db")?;
            Ok(registry)
        }
        DatabaseBackend::Memory => {
            tracing::warn!("using in-memory book store; data is lost on exit");
            Ok(registry_with_store(Arc::new(MemoryBookStore::new())))
        }
    }
}

/// Run the service until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = prepare(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("shelf-app bootstrap complete");
    let served = shelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    if settings.database.backend != DatabaseBackend::Postgres {
        bail!("migrations require the postgres backend");
    }

    let pool = shelf_db::connect(&settings.database)
        .await
        .context("could not load the database")?;
    let registry = registry_with_store(Arc::new(PgBookStore::new(pool.clone())));

    shelf_db::migrate(&pool, &registry.collect_migrations())
        .await
        .context("could not migrate db")
}
