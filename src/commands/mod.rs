pub mod configure;
pub mod list;
pub mod playground;
pub mod seed;
pub mod serve;
pub mod session;
pub mod sitemap;
pub mod stats;

use crate::config::Config;
use crate::core::operations::Storage;
use crate::server::open_storage;
use crate::utils::error::AppResult;

/// Storage for one-shot commands, ready to read and write
pub(crate) async fn ready_storage(config: &Config) -> AppResult<Storage> {
    let storage = open_storage(config);
    storage.ensure_ready().await?;
    Ok(storage)
}
