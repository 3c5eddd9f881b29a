use anyhow::Context;

use crate::config::AppConfig;
use crate::database::PgStore;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let result = store.migrate().await.context("failed to apply migrations");
    store.close().await;
    result
}
