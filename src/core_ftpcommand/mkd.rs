use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::quote_path;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the MKD (Make Directory) FTP command.
///
/// Creates a single directory; the parent must already exist.
pub async fn handle_mkd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::CreateNew) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        return respond_with_error(&writer, &FtpError::Syntax("MKD requires a directory name".to_string())).await;
    }

    let dir_path = session.resolve(&arg);
    match fs::create_dir(&dir_path).await {
        Ok(()) => {
            info!("[{}] Directory created successfully: {}", session.id, dir_path);
            let response = format!(
                "257 {} directory created.\r\n",
                quote_path(&session.virtual_path(&dir_path))
            );
            send_response(&writer, response.as_bytes()).await
        }
        Err(e) => {
            error!("[{}] Failed to create directory {}: {}", session.id, dir_path, e);
            send_response(&writer, b"550 Failed to create directory.\r\n").await
        }
    }
}
