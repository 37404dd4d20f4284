use crate::config::Config;
use crate::constants::FEATURES;
use crate::helpers::{multiline_reply, send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the FEAT (Feature) FTP command.
pub async fn handle_feat_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let response = multiline_reply(211, "Features:", FEATURES, "End");
    send_response(&writer, response.as_bytes()).await
}
