use crate::config::Config;
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Paths are always sent as UTF-8, so `OPTS UTF8` only acknowledges.
pub async fn handle_opts_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut parts = arg.split_whitespace();
    let option = parts.next().unwrap_or_default().to_ascii_uppercase();
    let value = parts.next().unwrap_or_default().to_ascii_uppercase();

    match (option.as_str(), value.as_str()) {
        ("UTF8", "ON") | ("UTF8", "") => send_response(&writer, b"200 Always in UTF8 mode.\r\n").await,
        ("UTF8", "OFF") => {
            respond_with_error(&writer, &FtpError::Unsupported("UTF8 cannot be disabled".to_string())).await
        }
        ("MLST", _) => send_response(&writer, b"200 MLST OPTS type;size;modify;\r\n").await,
        _ => respond_with_error(&writer, &FtpError::Syntax(format!("unknown option '{}'", arg))).await,
    }
}
