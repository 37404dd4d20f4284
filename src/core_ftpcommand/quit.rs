use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT FTP command. The dispatcher ends the session afterwards.
pub async fn handle_quit_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let id = {
        let mut session = session.lock().await;
        session.data_channel.reset();
        session.id
    };
    info!("[{}] Received QUIT command. Closing connection.", id);
    send_response(&writer, b"221 Service closing control connection.\r\n").await
}
