use crate::cli::ServeArgs;
use crate::config::Config;
use crate::server;
use crate::utils::error::AppResult;

pub async fn handle_serve_command(mut config: Config, args: &ServeArgs) -> AppResult<()> {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }

    tracing::info!(
        bind = %config.server.bind,
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        "starting engify"
    );
    server::serve(config).await
}
