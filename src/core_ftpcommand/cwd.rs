use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Moves the session to `target` if it resolves to an existing directory.
pub async fn change_directory(
    writer: &ControlWriter,
    session: &mut Session,
    target: &str,
) -> Result<(), std::io::Error> {
    let new_dir = session.resolve(target);
    match tokio::fs::metadata(&new_dir).await {
        Ok(metadata) if metadata.is_dir() => {
            session.current_dir = new_dir;
            info!(
                "[{}] Directory successfully changed to: {}",
                session.id,
                session.virtual_path(&session.current_dir)
            );
            send_response(writer, b"250 Directory successfully changed.\r\n").await
        }
        _ => {
            warn!("[{}] Failed to change directory to: {}", session.id, new_dir);
            send_response(writer, b"550 Failed to change directory.\r\n").await
        }
    }
}

pub async fn handle_cwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        return respond_with_error(&writer, &FtpError::Syntax("CWD requires a directory".to_string())).await;
    }

    change_directory(&writer, &mut session, &arg).await
}
