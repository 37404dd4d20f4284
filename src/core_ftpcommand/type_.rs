use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::{Session, TransferType};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Parses a TYPE argument: `A`, `E`, `I` or `L <byte size>`.
pub fn parse_transfer_type(arg: &str) -> Result<TransferType, FtpError> {
    let parts: Vec<&str> = arg.split_whitespace().collect();
    let primary_type = parts.first().map(|s| s.to_uppercase()).unwrap_or_default();

    match primary_type.as_str() {
        "A" => Ok(TransferType::Ascii),
        "E" => Ok(TransferType::Ebcdic),
        "I" => Ok(TransferType::Image),
        "L" => match parts.get(1).map(|size| size.parse::<u8>()) {
            Some(Ok(byte_size)) => Ok(TransferType::Local(byte_size)),
            Some(Err(_)) => Err(FtpError::Unsupported("invalid byte size".to_string())),
            None => Err(FtpError::Unsupported("TYPE L needs a byte size".to_string())),
        },
        "" => Err(FtpError::Syntax("TYPE requires a type code".to_string())),
        other => Err(FtpError::Unsupported(format!("TYPE {}", other))),
    }
}

/// Handles the TYPE FTP command.
///
/// The representation type is recorded for the session; file bytes are always
/// sent unchanged.
pub async fn handle_type_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    match parse_transfer_type(&arg) {
        Ok(transfer_type) => {
            session.transfer_type = transfer_type;
            send_response(&writer, format!("200 Type set to {}\r\n", transfer_type).as_bytes()).await
        }
        Err(e) => respond_with_error(&writer, &e).await,
    }
}
