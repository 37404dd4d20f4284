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
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncSeekExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// STOR: create or truncate, or overwrite from the restart point.
    Replace,
    /// APPE: create or append.
    Append,
}

impl StoreMode {
    fn verb(self) -> &'static str {
        match self {
            StoreMode::Replace => "STOR",
            StoreMode::Append => "APPE",
        }
    }
}

pub async fn open_for_write(path: &str, mode: StoreMode, offset: u64) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        StoreMode::Append => {
            options.append(true);
        }
        StoreMode::Replace if offset > 0 => {
            options.write(true);
        }
        StoreMode::Replace => {
            options.write(true).truncate(true);
        }
    }

    let mut file = options.open(path).await?;
    if mode == StoreMode::Replace && offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }
    Ok(file)
}

/// Handles the STOR (Store File) FTP command.
pub async fn handle_stor_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    store(writer, config, session, arg, StoreMode::Replace).await
}

/// Handles the APPE (Append) FTP command.
pub async fn handle_appe_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    store(writer, config, session, arg, StoreMode::Append).await
}

/// Creating a file needs create-new access; touching an existing one needs
/// full access.
async fn store(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
    mode: StoreMode,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::CreateNew) {
        return respond_with_error(&writer, &e).await;
    }
    if arg.is_empty() {
        warn!("[{}] {} command received with no arguments", session.id, mode.verb());
        return respond_with_error(&writer, &FtpError::Syntax(format!("{} requires a file name", mode.verb()))).await;
    }

    let file_path = session.resolve(&arg);
    if let Ok(metadata) = tokio::fs::metadata(&file_path).await {
        if metadata.is_dir() {
            return send_response(&writer, b"550 Cannot store over a directory.\r\n").await;
        }
        if let Err(e) = check_access(&session, AccessLevel::Full) {
            warn!("[{}] {} would overwrite existing {}", session.id, mode.verb(), file_path);
            return respond_with_error(&writer, &e).await;
        }
    }

    let offset = std::mem::take(&mut session.rest_point);
    let request = take_data_request(&mut session, &config);
    let data = match open_data_connection(&writer, request).await? {
        Some(data) => data,
        None => return Ok(()),
    };

    let file = match open_for_write(&file_path, mode, offset).await {
        Ok(file) => file,
        Err(e) => {
            error!("[{}] Failed to open {} for writing: {}", session.id, file_path, e);
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
    info!("[{}] {} {} at offset {}", session.id, mode.verb(), file_path, offset);
    session.start_transfer(
        writer.clone(),
        &config.server,
        TransferJob::Receive { file, data, path: file_path },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn write_with(path: &str, mode: StoreMode, offset: u64, bytes: &[u8]) {
        let mut file = open_for_write(path, mode, offset).await.unwrap();
        file.write_all(bytes).await.unwrap();
        file.flush().await.unwrap();
    }

    #[tokio::test]
    async fn replace_truncates_append_extends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let path = path.to_str().unwrap();

        write_with(path, StoreMode::Replace, 0, b"hello world").await;
        write_with(path, StoreMode::Replace, 0, b"bye").await;
        assert_eq!(std::fs::read(path).unwrap(), b"bye");

        write_with(path, StoreMode::Append, 0, b"!!").await;
        assert_eq!(std::fs::read(path).unwrap(), b"bye!!");
    }

    #[tokio::test]
    async fn replace_with_offset_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");
        let path = path.to_str().unwrap();

        write_with(path, StoreMode::Replace, 0, b"0123456789").await;
        write_with(path, StoreMode::Replace, 4, b"ab").await;
        assert_eq!(std::fs::read(path).unwrap(), b"0123ab6789");
    }

    #[tokio::test]
    async fn missing_parent_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("f.txt");
        assert!(open_for_write(path.to_str().unwrap(), StoreMode::Replace, 0).await.is_err());
        assert!(!dir.path().join("nope").exists());
    }
}
