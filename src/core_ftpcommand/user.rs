use crate::config::Config;
use crate::core_auth::AccessLevel;
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// Any previous login is dropped: the session goes back to not-logged-in and
/// waits for PASS with the new username.
pub async fn handle_user_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    username: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    session.access = AccessLevel::NotLoggedIn;

    let username = username.trim().to_string();
    if username.is_empty() {
        session.pending_username = None;
        return respond_with_error(&writer, &FtpError::Syntax("USER requires a name".to_string())).await;
    }

    info!("[{}] Received USER command with username: {}", session.id, username);
    session.pending_username = Some(username);
    send_response(&writer, b"331 User name okay, need password.\r\n").await
}
