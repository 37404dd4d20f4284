use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::core_ftpcommand::site::site_help::handle_site_help_command;
use crate::core_ftpcommand::site::site_idle::handle_site_idle_command;
use crate::helpers::{respond_with_error, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_site_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if let Err(e) = check_access(&*session.lock().await, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    let mut args: Vec<&str> = arg.split_whitespace().collect();
    if args.is_empty() {
        warn!("No subcommand provided for SITE command.");
        return respond_with_error(&writer, &FtpError::Syntax("SITE requires a subcommand".to_string())).await;
    }

    let subcommand = args.remove(0).to_ascii_uppercase();
    let sub_args: Vec<String> = args.iter().map(|s| s.to_string()).collect();

    match subcommand.as_str() {
        "HELP" => handle_site_help_command(writer, config, session, sub_args).await,
        "IDLE" => {
            info!("Handling SITE IDLE command with args: {:?}", sub_args);
            handle_site_idle_command(writer, config, session, sub_args).await
        }
        _ => {
            warn!("Unknown SITE subcommand: {}", subcommand);
            respond_with_error(&writer, &FtpError::Unsupported(format!("SITE {} not supported", subcommand))).await
        }
    }
}
