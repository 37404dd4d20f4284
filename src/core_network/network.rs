use crate::config::Config;
use crate::constants::{MAX_COMMAND_LINE, MAX_PENDING_COMMANDS};
use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::{parse_command_line, FtpCommand};
use crate::core_ftpcommand::handlers::dispatch_command;
use crate::core_network::lines::{ControlLine, LineReader};
use crate::core_transfer::TransferHandle;
use crate::helpers::{respond_with_error, send_response, ControlChannel, ControlWriter};
use crate::session::{next_session_id, Session};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, timeout};

type ControlLines = LineReader<OwnedReadHalf>;

pub async fn start_server(config: Arc<Config>) -> Result<()> {
    let listener = bind_listener(&config).await?;
    serve(listener, config).await
}

pub async fn bind_listener(config: &Config) -> Result<TcpListener> {
    let address = format!("{}:{}", config.server.listen_address, config.server.listen_port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind control listener on {}", address))?;
    info!("Server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Canonical form of the configured root; every session is confined below it.
pub fn canonical_root(root_dir: &str) -> Result<String> {
    let path = Path::new(root_dir)
        .canonicalize()
        .with_context(|| format!("Failed to resolve root directory: {}", root_dir))?;
    if !path.is_dir() {
        anyhow::bail!("Root directory is not a directory: {}", path.display());
    }
    path.to_str()
        .map(str::to_string)
        .with_context(|| format!("Root directory is not valid UTF-8: {}", path.display()))
}

/// Accept loop. Never returns unless the root directory is unusable.
pub async fn serve(listener: TcpListener, config: Arc<Config>) -> Result<()> {
    let root_dir = canonical_root(&config.server.root_dir)?;
    let limiter = Arc::new(Semaphore::new(config.server.max_sessions));
    info!("Serving {} (max {} sessions)", root_dir, config.server.max_sessions);

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                sleep(Duration::from_millis(100)).await;
                continue;
            }
        };

        let permit = match Arc::clone(&limiter).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Refusing connection from {}: session limit reached", addr);
                tokio::spawn(refuse_connection(socket));
                continue;
            }
        };

        let id = next_session_id();
        info!("[{}] New connection from {}", id, addr);
        let config = Arc::clone(&config);
        let root_dir = root_dir.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, config, root_dir, id).await {
                error!("[{}] Connection error: {:#}", id, e);
            }
            info!("[{}] Connection closed for {}", id, addr);
            drop(permit);
        });
    }
}

async fn refuse_connection(mut socket: TcpStream) {
    let _ = socket.write_all(b"421 Too many connections, try again later.\r\n").await;
    let _ = socket.shutdown().await;
}

pub async fn handle_connection(socket: TcpStream, config: Arc<Config>, root_dir: String, id: u64) -> Result<()> {
    let peer_addr = socket.peer_addr()?;
    let local_addr = socket.local_addr()?;
    let (read_half, write_half) = socket.into_split();
    let writer = ControlChannel::new(write_half).into_writer();
    let session = Arc::new(Mutex::new(Session::new(
        id,
        root_dir,
        peer_addr,
        local_addr,
        &config.server,
    )));
    let mut lines = LineReader::new(read_half, MAX_COMMAND_LINE);

    let result = command_loop(id, &writer, &config, &session, &mut lines).await;

    {
        let mut session = session.lock().await;
        if let Some(handle) = session.transfer.take() {
            handle.abort.request();
            let _ = handle.join.await;
        }
        session.data_channel.reset();
    }
    if let Err(e) = writer.lock().await.shutdown().await {
        debug!("[{}] Control shutdown: {}", id, e);
    }
    result
}

async fn command_loop(
    id: u64,
    writer: &ControlWriter,
    config: &Arc<Config>,
    session: &Arc<Mutex<Session>>,
    lines: &mut ControlLines,
) -> Result<()> {
    send_response(writer, format!("220 {}\r\n", config.server.banner).as_bytes()).await?;

    // Lines that arrived while a transfer was running.
    let mut pending: VecDeque<String> = VecDeque::new();

    loop {
        let line = match pending.pop_front() {
            Some(line) => line,
            None => {
                let idle_timeout = session.lock().await.idle_timeout;
                match timeout(idle_timeout, lines.next_line()).await {
                    Err(_) => {
                        warn!("[{}] Idle for {}s, closing", id, idle_timeout.as_secs());
                        send_response(writer, b"421 Timeout: closing control connection.\r\n").await?;
                        break;
                    }
                    Ok(Ok(None)) => {
                        info!("[{}] Client disconnected", id);
                        break;
                    }
                    Ok(Ok(Some(ControlLine::Line(line)))) => {
                        writer.lock().await.touch();
                        line
                    }
                    Ok(Ok(Some(ControlLine::TooLong))) => {
                        writer.lock().await.touch();
                        warn!("[{}] Control line over {} bytes rejected", id, MAX_COMMAND_LINE);
                        respond_with_error(writer, &FtpError::LineTooLong).await?;
                        continue;
                    }
                    Ok(Err(e)) => return Err(e).context("Failed to read from control connection"),
                }
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        if !dispatch_command(writer, config, session, &line).await? {
            break;
        }

        let transfer = session.lock().await.transfer.take();
        if let Some(handle) = transfer {
            if !supervise_transfer(id, writer, session, lines, &mut pending, handle).await? {
                info!("[{}] Client went away during transfer", id);
                break;
            }
        }
    }

    Ok(())
}

/// Holds a line back until the running transfer ends. Returns `false` when
/// the queue is already full.
pub fn queue_pending(pending: &mut VecDeque<String>, line: String) -> bool {
    if pending.len() >= MAX_PENDING_COMMANDS {
        return false;
    }
    pending.push_back(line);
    true
}

/// Waits for a transfer worker while still reading the control channel.
///
/// ABOR raises the worker's abort flag; the worker answers 426 and this side
/// follows with 226 once it has stopped. Anything else is queued and run after
/// the transfer, up to a small limit; beyond it lines are refused with 503.
/// Returns `false` if the control connection closed meanwhile.
async fn supervise_transfer(
    id: u64,
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    lines: &mut ControlLines,
    pending: &mut VecDeque<String>,
    handle: TransferHandle,
) -> Result<bool> {
    let TransferHandle { mut join, abort } = handle;
    let mut aborted = false;
    let mut connected = true;

    let joined = loop {
        tokio::select! {
            joined = &mut join => break joined,
            segment = lines.next_line(), if connected => match segment {
                Ok(Some(ControlLine::Line(line))) => {
                    writer.lock().await.touch();
                    let (verb, _) = parse_command_line(&line);
                    if FtpCommand::parse(&verb) == Some(FtpCommand::ABOR) {
                        info!("[{}] ABOR received, stopping transfer", id);
                        aborted = true;
                        abort.request();
                    } else if line.trim().is_empty() {
                        continue;
                    } else if queue_pending(pending, line) {
                        debug!("[{}] Queued during transfer", id);
                    } else {
                        warn!("[{}] Command queue full during transfer", id);
                        let busy = FtpError::BadSequence("transfer in progress".to_string());
                        respond_with_error(writer, &busy).await?;
                    }
                }
                Ok(Some(ControlLine::TooLong)) => {
                    writer.lock().await.touch();
                    respond_with_error(writer, &FtpError::LineTooLong).await?;
                }
                Ok(None) | Err(_) => {
                    connected = false;
                    abort.request();
                }
            }
        }
    };

    match joined {
        Ok(buffer) => session.lock().await.restore_buffer(buffer),
        Err(e) => {
            error!("[{}] Transfer worker failed: {}", id, e);
            if connected {
                respond_with_error(writer, &FtpError::Local(e.to_string())).await?;
            }
        }
    }

    if !connected {
        return Ok(false);
    }
    if aborted {
        send_response(writer, b"226 ABOR command successful.\r\n").await?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_queue_is_bounded() {
        let mut pending = VecDeque::new();
        for n in 0..MAX_PENDING_COMMANDS {
            assert!(queue_pending(&mut pending, format!("NOOP {}\r\n", n)));
        }
        assert!(!queue_pending(&mut pending, "PWD\r\n".to_string()));
        assert_eq!(pending.len(), MAX_PENDING_COMMANDS);
        assert_eq!(pending.front().map(String::as_str), Some("NOOP 0\r\n"));
    }

    #[test]
    fn canonical_root_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        let root = canonical_root(dir.path().to_str().unwrap()).unwrap();
        assert!(Path::new(&root).is_absolute());
        assert!(canonical_root(file.to_str().unwrap()).is_err());
        assert!(canonical_root("/definitely/not/here").is_err());
    }
}
