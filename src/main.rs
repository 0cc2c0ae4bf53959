use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use tenant_issue_tracker as tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = tracker::config::load_config().context("failed to load configuration")?;
    tracker::config::init_tracing(cfg.log_level(), cfg.log_json);

    info!(environment = %cfg.environment, "starting tenant issue tracker");

    let db_pool = tracker::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    tracker::db::check_connection(&db_pool).await?;

    if cfg.auto_migrate {
        tracker::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    if cfg.verify_schema {
        tracker::schema::verify(&db_pool)
            .await
            .context("database schema does not match the table definitions")?;
    }

    for (table, rows) in tracker::schema::row_counts(&db_pool).await? {
        info!(table, rows, "table ready");
    }

    let backend = tracker::db::backend_name(&db_pool);
    let services = tracker::AppServices::new(Arc::new(db_pool));
    let users = services.users.list_users().await?;
    info!(backend, users = users.len(), "tenant issue tracker ready");

    Ok(())
}
