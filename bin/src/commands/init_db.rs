//! Database initialization command.

use crate::config::open_store;
use anyhow::Result;

/// Create the schema in the configured database.
pub(crate) async fn init_db(database_url: Option<&str>) -> Result<()> {
    let store = open_store(database_url).await?;
    store.pool().close().await;
    println!("Database ready.");
    Ok(())
}
