use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles REST: the next RETR/STOR starts at this byte offset.
pub async fn handle_rest_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    match arg.trim().parse::<u64>() {
        Ok(offset) => {
            session.rest_point = offset;
            debug!("[{}] Restart point set to {}", session.id, offset);
            let response = format!(
                "350 Restarting at {}. Send STORE or RETRIEVE to initiate transfer.\r\n",
                offset
            );
            send_response(&writer, response.as_bytes()).await
        }
        Err(_) => respond_with_error(&writer, &FtpError::Syntax(format!("invalid offset '{}'", arg))).await,
    }
}
