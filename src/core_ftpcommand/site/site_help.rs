use crate::config::Config;
use crate::helpers::{multiline_reply, send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_site_help_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _args: Vec<String>,
) -> Result<(), std::io::Error> {
    let reply = multiline_reply(
        214,
        "The following SITE commands are recognized:",
        &["HELP", "IDLE [<seconds>]"],
        "SITE help OK.",
    );
    send_response(&writer, reply.as_bytes()).await
}
