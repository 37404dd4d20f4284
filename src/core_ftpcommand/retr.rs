use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::{open_data_connection, take_data_request};
use crate::core_transfer::TransferJob;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{error, info, warn};
use std::io::{self, SeekFrom};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tokio::sync::Mutex;

/// Opens a regular file for reading, positioned at `offset`.
pub async fn open_for_read(path: &str, offset: u64) -> io::Result<File> {
    let mut file = File::open(path).await?;
    if !file.metadata().await?.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }
    Ok(file)
}

/// Handles the RETR (Retrieve) FTP command.
///
/// Sends the file from the session's restart point onward. The restart point
/// is consumed whatever the outcome.
pub async fn handle_retr_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        warn!("[{}] RETR command received with no arguments", session.id);
        return respond_with_error(&writer, &FtpError::Syntax("RETR requires a file name".to_string())).await;
    }

    let file_path = session.resolve(&arg);
    let offset = std::mem::take(&mut session.rest_point);
    let request = take_data_request(&mut session, &config);
    let data = match open_data_connection(&writer, request).await? {
        Some(data) => data,
        None => return Ok(()),
    };

    let file = match open_for_read(&file_path, offset).await {
        Ok(file) => file,
        Err(e) => {
            error!("[{}] File not found or could not be opened: {}: {}", session.id, file_path, e);
            drop(data);
            return respond_with_error(&writer, &FtpError::FileUnavailable(e)).await;
        }
    };

    let opening = format!(
        "150 Opening {} mode data connection for {}.\r\n",
        session.transfer_type.mode_name(),
        session.virtual_path(&file_path)
    );
    send_response(&writer, opening.as_bytes()).await?;
    info!("[{}] RETR {} from offset {}", session.id, file_path, offset);
    session.start_transfer(
        writer.clone(),
        &config.server,
        TransferJob::Send { file, data, path: file_path },
    );
    Ok(())
}
