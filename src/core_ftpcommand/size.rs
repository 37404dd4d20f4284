// core_ftpcommand/size.rs

use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SIZE (File Size) FTP command.
pub async fn handle_size_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        return respond_with_error(&writer, &FtpError::Syntax("SIZE requires a file name".to_string())).await;
    }

    let file_path = session.resolve(&arg);
    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("[{}] Failed to get file metadata for {}: {}", session.id, file_path, e);
            return respond_with_error(&writer, &FtpError::FileUnavailable(e)).await;
        }
    };

    if !metadata.is_file() {
        return send_response(&writer, b"550 Requested action not taken (not a file).\r\n").await;
    }

    debug!("[{}] File size for {} is {}", session.id, file_path, metadata.len());
    send_response(&writer, format!("213 {}\r\n", metadata.len()).as_bytes()).await
}
