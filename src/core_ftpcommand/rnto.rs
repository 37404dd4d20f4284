use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the RNTO (Rename To) FTP command, consuming the RNFR source.
pub async fn handle_rnto_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    let rename_from = session.rename_from.take();
    if let Err(e) = check_access(&session, AccessLevel::Full) {
        return respond_with_error(&writer, &e).await;
    }
    let source = match rename_from {
        Some(source) => source,
        None => {
            return respond_with_error(&writer, &FtpError::BadSequence("send RNFR first".to_string())).await;
        }
    };
    if arg.is_empty() {
        return respond_with_error(&writer, &FtpError::Syntax("RNTO requires a path".to_string())).await;
    }

    let target = session.resolve(&arg);
    if session.is_root(&target) {
        return send_response(&writer, b"550 Rename failed.\r\n").await;
    }

    match fs::rename(&source, &target).await {
        Ok(()) => {
            info!("[{}] Renamed {} to {}", session.id, source, target);
            send_response(&writer, b"250 Rename successful.\r\n").await
        }
        Err(e) => {
            error!("[{}] Failed to rename {} to {}: {}", session.id, source, target, e);
            send_response(&writer, b"550 Rename failed.\r\n").await
        }
    }
}
