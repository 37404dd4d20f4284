use crate::config::Config;
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// AUTH, PBSZ and PROT: the control and data channels are always plain text.
pub async fn handle_security_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let id = session.lock().await.id;
    info!("[{}] Refusing security extension request '{}'", id, arg);
    respond_with_error(&writer, &FtpError::Unsupported("security extensions".to_string())).await
}
