use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the DELE (Delete File) FTP command.
///
/// Only regular files are removed; directories go through RMD.
pub async fn handle_dele_command(
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
        return respond_with_error(&writer, &FtpError::Syntax("DELE requires a file name".to_string())).await;
    }

    let file_path = session.resolve(&arg);
    match fs::metadata(&file_path).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => {
            return send_response(&writer, b"550 File does not exist.\r\n").await;
        }
    }

    match fs::remove_file(&file_path).await {
        Ok(()) => {
            info!("[{}] Deleted file {}", session.id, file_path);
            let response = format!("250 \"{}\" file deleted.\r\n", session.virtual_path(&file_path));
            send_response(&writer, response.as_bytes()).await
        }
        Err(e) => {
            error!("[{}] Failed to delete {}: {}", session.id, file_path, e);
            send_response(&writer, b"550 Failed to delete file.\r\n").await
        }
    }
}
