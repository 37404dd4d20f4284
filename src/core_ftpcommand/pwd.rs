// src/core_ftpcommand/pwd.rs
use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_ftpcommand::utils::quote_path;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_pwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    let current = session.virtual_path(&session.current_dir);
    let response = format!("257 {} is the current directory.\r\n", quote_path(&current));
    send_response(&writer, response.as_bytes()).await
}
