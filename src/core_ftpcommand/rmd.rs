use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the RMD (Remove Directory) FTP command. Only empty directories go.
pub async fn handle_rmd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::Full) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        return respond_with_error(&writer, &FtpError::Syntax("RMD requires a directory name".to_string())).await;
    }

    let dir_path = session.resolve(&arg);
    if session.is_root(&dir_path) {
        warn!("[{}] Refusing to remove the root directory", session.id);
        return send_response(&writer, b"550 Cannot remove the root directory.\r\n").await;
    }

    match fs::remove_dir(&dir_path).await {
        Ok(()) => {
            info!("[{}] Removed directory {}", session.id, dir_path);
            send_response(&writer, b"250 Directory removed.\r\n").await
        }
        Err(e) => {
            error!("[{}] Failed to remove directory {}: {}", session.id, dir_path, e);
            send_response(&writer, b"550 Failed to remove directory.\r\n").await
        }
    }
}
