use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// ABOR with nothing in flight. An ABOR arriving during a transfer never gets
/// here; the connection loop intercepts it and raises the worker's abort flag.
pub async fn handle_abor_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    session.lock().await.data_channel.reset();
    send_response(&writer, b"226 No transfer to abort.\r\n").await
}
