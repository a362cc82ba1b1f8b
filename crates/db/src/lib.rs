//! PostgreSQL connection factory and migration runner.
//!
//! The pool returned by [`connect`] is the process-wide session shared by every
//! in-flight request; [`migrate`] applies the schema contributed by modules.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Context};
use shelf_kernel::settings::DatabaseSettings;
use shelf_kernel::Migration;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

/// Build connection options from settings without touching the network.
pub fn connect_options(settings: &DatabaseSettings) -> anyhow::Result<PgConnectOptions> {
    let ssl_mode: PgSslMode = settings
        .ssl_mode
        .parse()
        .map_err(|_| anyhow!("unsupported database ssl_mode '{}'", settings.ssl_mode))?;

    Ok(PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.name)
        .ssl_mode(ssl_mode))
}

/// Open the shared connection pool.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let options = connect_options(settings)?;

    tracing::info!(
        target: "shelf-db",
        endpoint = %settings.endpoint(),
        max_connections = settings.max_connections,
        "connecting to database"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .with_context(|| format!("could not connect to {}", settings.endpoint()))
}

/// Apply every migration not yet recorded in the `schema_migrations` ledger.
///
/// Each migration runs in its own transaction together with its ledger row, so a
/// failed migration leaves neither partial schema nor a record behind.
pub async fn migrate(pool: &PgPool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    sqlx::raw_sql(LEDGER_DDL)
        .execute(pool)
        .await
        .context("could not create schema_migrations table")?;

    let applied: Vec<(String, String)> = sqlx::query_as("SELECT module, id FROM schema_migrations")
        .fetch_all(pool)
        .await
        .context("could not read schema_migrations")?;

    let todo = pending(&applied, migrations);
    for (module, migration) in &todo {
        tracing::info!(target: "shelf-db", %module, id = migration.id, "applying migration");

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO schema_migrations (module, id) VALUES ($1, $2)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit()
            .await
            .with_context(|| format!("could not commit migration {}/{}", module, migration.id))?;
    }

    tracing::info!(target: "shelf-db", applied = todo.len(), "migrations up to date");
    Ok(todo.len())
}

/// Migrations from `migrations` whose `(module, id)` is absent from `applied`.
fn pending<'a>(
    applied: &[(String, String)],
    migrations: &'a [(String, Migration)],
) -> Vec<&'a (String, Migration)> {
    let done: HashSet<(&str, &str)> = applied
        .iter()
        .map(|(module, id)| (module.as_str(), id.as_str()))
        .collect();

    migrations
        .iter()
        .filter(|(module, migration)| !done.contains(&(module.as_str(), migration.id)))
        .collect()
}
