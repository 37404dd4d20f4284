use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::{open_data_connection, take_data_request};
use crate::core_transfer::{read_listing, ListFormat, TransferJob};
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Drops leading `ls` style flags (`-la`, `-a -l`) from a LIST argument.
pub fn strip_list_flags(arg: &str) -> &str {
    let mut rest = arg.trim_start();
    while rest.starts_with('-') {
        rest = match rest.split_once(' ') {
            Some((_, tail)) => tail.trim_start(),
            None => "",
        };
    }
    rest
}

/// Shared by LIST and MLSD: opens the data socket, reads the directory and
/// hands both to a transfer worker.
pub async fn start_listing(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    target: &str,
    format: ListFormat,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    let dir_path = session.resolve(target);
    let request = take_data_request(&mut session, &config);
    let data = match open_data_connection(&writer, request).await? {
        Some(data) => data,
        None => return Ok(()),
    };

    let entries = match read_listing(Path::new(&dir_path), format).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("[{}] Failed to list {}: {}", session.id, dir_path, e);
            drop(data);
            return respond_with_error(&writer, &FtpError::FileUnavailable(e)).await;
        }
    };

    send_response(&writer, b"150 Here comes the directory listing.\r\n").await?;
    info!(
        "[{}] Listing {} ({} entries)",
        session.id,
        session.virtual_path(&dir_path),
        entries.len()
    );
    session.start_transfer(writer.clone(), &config.server, TransferJob::Listing { entries, format, data });
    Ok(())
}

pub async fn handle_list_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let target = strip_list_flags(&arg).to_string();
    start_listing(writer, config, session, &target, ListFormat::Unix).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_dropped() {
        assert_eq!(strip_list_flags("-la"), "");
        assert_eq!(strip_list_flags("-a -l sub dir"), "sub dir");
        assert_eq!(strip_list_flags("sub"), "sub");
        assert_eq!(strip_list_flags(""), "");
    }
}
