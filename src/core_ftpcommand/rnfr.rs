use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RNFR (Rename From) FTP command.
///
/// Remembers the source for the following RNTO.
pub async fn handle_rnfr_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    session.rename_from = None;
    if let Err(e) = check_access(&session, AccessLevel::Full) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        return respond_with_error(&writer, &FtpError::Syntax("RNFR requires a path".to_string())).await;
    }

    let path = session.resolve(&arg);
    if session.is_root(&path) || tokio::fs::metadata(&path).await.is_err() {
        return send_response(&writer, b"550 File or directory does not exist.\r\n").await;
    }

    debug!("[{}] Rename source set to {}", session.id, path);
    session.rename_from = Some(path);
    send_response(&writer, b"350 Ready for RNTO.\r\n").await
}
