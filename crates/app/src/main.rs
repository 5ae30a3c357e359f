use std::{sync::Arc, time::Duration};

use engine::{LogNotifier, Notifier};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "shortlet={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let notifier = build_notifier(settings.notifier.as_ref());

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let engine = match engine::Engine::builder()
                .database(db)
                .notifier(notifier)
                .build()
                .await
            {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine from database: {err}");
                    return;
                }
            };
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            server::run(engine, &addr).await;
        });
    } else {
        tracing::warn!("no [server] settings found, nothing to run");
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

/// Webhook delivery when configured, log lines otherwise.
fn build_notifier(config: Option<&settings::Notifier>) -> Arc<dyn Notifier> {
    let Some(config) = config else {
        return Arc::new(LogNotifier);
    };

    match server::WebhookNotifier::new(
        &config.webhook_url,
        Duration::from_secs(config.timeout_secs),
    ) {
        Ok(notifier) => {
            tracing::info!("booking notifications go to {}", config.webhook_url);
            Arc::new(notifier)
        }
        Err(err) => {
            tracing::error!("webhook notifier unavailable, falling back to logs: {err}");
            Arc::new(LogNotifier)
        }
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
