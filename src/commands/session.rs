use super::ready_storage;
use crate::cli::SessionCommands;
use crate::config::Config;
use crate::manager::SessionService;
use crate::utils::error::AppResult;
use crate::utils::format::format_datetime;
use crate::utils::output::OutputStyle;
use crate::utils::{print_success, print_warning};

pub async fn handle_session_command(config: Config, command: SessionCommands) -> AppResult<()> {
    let storage = ready_storage(&config).await?;
    let sessions = SessionService::new(&storage, config.auth.session_ttl_hours);

    match command {
        SessionCommands::Create { email, role } => {
            if !config.auth.admin_roles.iter().any(|r| r == role.trim()) {
                print_warning(&format!("Role '{}' cannot use the admin API", role.trim()));
            }
            let session = sessions.create(&email, &role).await?;
            print_success(&format!("Session issued for {}", session.email));
            OutputStyle::print_field_colored("Cookie", &config.auth.session_cookie, OutputStyle::label);
            OutputStyle::print_field_colored("Token", &session.token, OutputStyle::command);
            OutputStyle::print_field_colored("Expires", &format_datetime(&session.expires_at), OutputStyle::muted);
        }
        SessionCommands::Revoke { token } => {
            if sessions.revoke(&token).await? {
                print_success("Session revoked");
            } else {
                print_warning("No session with that token");
            }
        }
        SessionCommands::Purge => {
            let purged = sessions.purge_expired().await?;
            print_success(&format!("Removed {} expired session(s)", purged));
        }
    }
    Ok(())
}
