use crate::config::Config;
use crate::core_auth::{authenticate, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command.
///
/// Completes the USER/PASS pair against the configured account. This is the
/// only place a session's access level can rise.
pub async fn handle_pass_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    password: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;

    let username = match session.pending_username.take() {
        Some(username) => username,
        None => {
            return respond_with_error(&writer, &FtpError::BadSequence("send USER first".to_string())).await;
        }
    };

    let access = authenticate(&config.account, &username, &password);
    if access == AccessLevel::NotLoggedIn {
        warn!("[{}] Login failed for user {} from {}", session.id, username, session.peer_addr);
        session.access = AccessLevel::NotLoggedIn;
        return respond_with_error(&writer, &FtpError::LoginIncorrect).await;
    }

    session.access = access;
    info!("[{}] User {} logged in with {} access", session.id, username, access);
    send_response(&writer, b"230 User logged in, proceed.\r\n").await
}
