//! Background transfer of one file or listing over an established data socket.
//!
//! Every transfer runs the same loop: poll the abort flag, move one buffer,
//! keep the control channel alive. The worker owns the data socket and the
//! file handle, so both are closed when it returns, whatever the outcome.

use crate::config::ServerConfig;
use crate::constants::KEEPALIVE_LINE;
use crate::core_error::FtpError;
use crate::core_transfer::listing::{render, ListEntry, ListFormat};
use crate::helpers::ControlWriter;
use chrono::Local;
use log::{debug, error, info, warn};
use std::io;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Control-side half of the abort flag.
#[derive(Debug)]
pub struct AbortSignal(watch::Sender<bool>);

/// Worker-side half of the abort flag.
#[derive(Debug)]
pub struct AbortWatch(watch::Receiver<bool>);

pub fn abort_pair() -> (AbortSignal, AbortWatch) {
    let (tx, rx) = watch::channel(false);
    (AbortSignal(tx), AbortWatch(rx))
}

impl AbortSignal {
    pub fn request(&self) {
        self.0.send_replace(true);
    }
}

impl AbortWatch {
    pub fn is_requested(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once an abort is requested or the signal side is gone.
    pub async fn requested(&mut self) {
        let _ = self.0.wait_for(|aborted| *aborted).await;
    }
}

/// Which side of a transfer an I/O error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Data,
    Local,
}

#[derive(Debug)]
pub enum TransferStatus {
    Completed(u64),
    Aborted(u64),
    Failed { side: Endpoint, error: io::Error },
}

#[derive(Debug)]
pub enum TransferJob {
    /// RETR: file to data socket.
    Send { file: File, data: TcpStream, path: String },
    /// STOR/APPE: data socket to file.
    Receive { file: File, data: TcpStream, path: String },
    /// LIST/MLSD: rendered entries to data socket.
    Listing { entries: Vec<ListEntry>, format: ListFormat, data: TcpStream },
}

/// A running worker: joined by the session loop, which gets the buffer back.
#[derive(Debug)]
pub struct TransferHandle {
    pub join: JoinHandle<Vec<u8>>,
    pub abort: AbortSignal,
}

pub struct TransferContext {
    pub session_id: u64,
    pub control: ControlWriter,
    pub abort: AbortWatch,
    pub keepalive: Option<Duration>,
    pub io_timeout: Duration,
}

impl TransferContext {
    /// Writes a keepalive line if the control channel has been silent too long.
    async fn keep_control_alive(&self) {
        let Some(keepalive) = self.keepalive else {
            return;
        };
        let mut control = self.control.lock().await;
        if control.idle_for() >= keepalive {
            debug!("[{}] Control channel keepalive", self.session_id);
            if let Err(e) = control.send(KEEPALIVE_LINE).await {
                warn!("[{}] Failed to send keepalive: {}", self.session_id, e);
            }
        }
    }
}

/// Copies `reader` into `writer` one buffer at a time until EOF, abort or error.
pub async fn pump<R, W>(
    ctx: &mut TransferContext,
    reader: &mut R,
    writer: &mut W,
    buffer: &mut [u8],
    reader_side: Endpoint,
) -> TransferStatus
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let writer_side = match reader_side {
        Endpoint::Data => Endpoint::Local,
        Endpoint::Local => Endpoint::Data,
    };
    let io_timeout = ctx.io_timeout;
    let mut total: u64 = 0;

    loop {
        if ctx.abort.is_requested() {
            return TransferStatus::Aborted(total);
        }

        let read = tokio::select! {
            biased;
            _ = ctx.abort.requested() => return TransferStatus::Aborted(total),
            read = timeout(io_timeout, reader.read(buffer)) => read,
        };
        let n = match read {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
            Ok(Err(error)) => return TransferStatus::Failed { side: reader_side, error },
            Err(_) => return TransferStatus::Failed { side: reader_side, error: timed_out() },
        };

        let written = tokio::select! {
            biased;
            _ = ctx.abort.requested() => return TransferStatus::Aborted(total),
            written = timeout(io_timeout, writer.write_all(&buffer[..n])) => written,
        };
        match written {
            Ok(Ok(())) => total += n as u64,
            Ok(Err(error)) => return TransferStatus::Failed { side: writer_side, error },
            Err(_) => return TransferStatus::Failed { side: writer_side, error: timed_out() },
        }

        ctx.keep_control_alive().await;
    }

    if let Err(error) = writer.flush().await {
        return TransferStatus::Failed { side: writer_side, error };
    }
    TransferStatus::Completed(total)
}

fn timed_out() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "data transfer stalled")
}

/// Final control reply for a finished transfer.
pub fn final_reply(status: &TransferStatus, success: &str) -> String {
    match status {
        TransferStatus::Completed(_) => format!("226 {}\r\n", success),
        TransferStatus::Aborted(_) | TransferStatus::Failed { side: Endpoint::Data, .. } => {
            FtpError::Aborted.to_ftp_response()
        }
        TransferStatus::Failed { side: Endpoint::Local, error } => {
            FtpError::Local(error.to_string()).to_ftp_response()
        }
    }
}

async fn close_data(session_id: u64, data: &mut TcpStream, status: &TransferStatus) {
    // Only a clean end gets a FIN; anything else just drops the socket.
    if let TransferStatus::Completed(_) = status {
        if let Err(e) = data.shutdown().await {
            warn!("[{}] Could not shut down data connection: {}", session_id, e);
        }
    }
}

/// Runs one job to completion and sends its final reply.
pub async fn run_transfer(ctx: &mut TransferContext, job: TransferJob, buffer: &mut [u8]) {
    let (status, label, success) = match job {
        TransferJob::Send { mut file, mut data, path } => {
            info!("[{}] Sending file {}", ctx.session_id, path);
            let status = pump(ctx, &mut file, &mut data, buffer, Endpoint::Local).await;
            close_data(ctx.session_id, &mut data, &status).await;
            (status, path, "Transfer complete.")
        }
        TransferJob::Receive { mut file, mut data, path } => {
            info!("[{}] Receiving file {}", ctx.session_id, path);
            let status = pump(ctx, &mut data, &mut file, buffer, Endpoint::Data).await;
            (status, path, "Transfer complete.")
        }
        TransferJob::Listing { entries, format, mut data } => {
            let body = render(&entries, format, Local::now());
            let mut reader = body.as_bytes();
            let status = pump(ctx, &mut reader, &mut data, buffer, Endpoint::Local).await;
            close_data(ctx.session_id, &mut data, &status).await;
            (status, format!("listing ({} entries)", entries.len()), "Directory send OK.")
        }
    };

    match &status {
        TransferStatus::Completed(bytes) => {
            info!("[{}] Transfer of {} complete: {} bytes", ctx.session_id, label, bytes)
        }
        TransferStatus::Aborted(bytes) => {
            warn!("[{}] Transfer of {} aborted after {} bytes", ctx.session_id, label, bytes)
        }
        TransferStatus::Failed { side, error } => {
            error!("[{}] Transfer of {} failed on {:?} side: {}", ctx.session_id, label, side, error)
        }
    }

    let reply = final_reply(&status, success);
    let mut control = ctx.control.lock().await;
    if let Err(e) = control.send(reply.as_bytes()).await {
        warn!("[{}] Failed to send transfer reply: {}", ctx.session_id, e);
    }
}

/// Spawns the worker. The buffer comes back through the join handle.
pub fn spawn_transfer(
    session_id: u64,
    control: ControlWriter,
    config: &ServerConfig,
    job: TransferJob,
    mut buffer: Vec<u8>,
) -> TransferHandle {
    let (signal, watch) = abort_pair();
    let mut ctx = TransferContext {
        session_id,
        control,
        abort: watch,
        keepalive: config.keepalive_interval(),
        io_timeout: config.data_timeout(),
    };
    let join = tokio::spawn(async move {
        run_transfer(&mut ctx, job, &mut buffer).await;
        buffer
    });
    TransferHandle { join, abort: signal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::ControlChannel;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    async fn control_pair() -> (ControlWriter, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        let (_read, write) = server.into_split();
        (ControlChannel::new(write).into_writer(), client)
    }

    fn context(control: ControlWriter, abort: AbortWatch) -> TransferContext {
        TransferContext {
            session_id: 1,
            control,
            abort,
            keepalive: None,
            io_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn pump_copies_everything_in_small_chunks() {
        let (control, _client) = control_pair().await;
        let (_signal, watch) = abort_pair();
        let mut ctx = context(control, watch);

        let source: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut reader = source.as_slice();
        let mut sink = Vec::new();
        let mut buffer = vec![0u8; 64];

        let status = pump(&mut ctx, &mut reader, &mut sink, &mut buffer, Endpoint::Local).await;
        assert!(matches!(status, TransferStatus::Completed(10_000)));
        assert_eq!(sink, source);
    }

    #[tokio::test]
    async fn pump_stops_immediately_when_aborted() {
        let (control, _client) = control_pair().await;
        let (signal, watch) = abort_pair();
        let mut ctx = context(control, watch);
        signal.request();

        let source = vec![7u8; 4096];
        let mut reader = source.as_slice();
        let mut sink = Vec::new();
        let mut buffer = vec![0u8; 512];

        let status = pump(&mut ctx, &mut reader, &mut sink, &mut buffer, Endpoint::Local).await;
        assert!(matches!(status, TransferStatus::Aborted(0)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn keepalive_is_written_on_a_silent_control_channel() {
        let (control, client) = control_pair().await;
        let (_signal, watch) = abort_pair();
        let mut ctx = context(control, watch);
        ctx.keepalive = Some(Duration::from_millis(0));

        let source = vec![1u8; 16];
        let mut reader = source.as_slice();
        let mut sink = Vec::new();
        let mut buffer = vec![0u8; 8];
        pump(&mut ctx, &mut reader, &mut sink, &mut buffer, Endpoint::Local).await;

        let mut lines = tokio::io::BufReader::new(client);
        let mut line = String::new();
        lines.read_line(&mut line).await.unwrap();
        assert_eq!(line, "\r\n");
    }

    #[tokio::test]
    async fn no_keepalive_when_disabled() {
        let (control, client) = control_pair().await;
        let (_signal, watch) = abort_pair();
        let mut ctx = context(control, watch);

        let source = vec![1u8; 16];
        let mut reader = source.as_slice();
        let mut sink = Vec::new();
        let mut buffer = vec![0u8; 8];
        pump(&mut ctx, &mut reader, &mut sink, &mut buffer, Endpoint::Local).await;

        let mut lines = tokio::io::BufReader::new(client);
        let mut line = String::new();
        let read = timeout(Duration::from_millis(200), lines.read_line(&mut line)).await;
        assert!(read.is_err(), "unexpected control output {:?}", line);
    }

    #[test]
    fn final_reply_codes() {
        let local = io::Error::new(io::ErrorKind::Other, "disk full");
        let data = io::Error::new(io::ErrorKind::BrokenPipe, "reset");
        assert!(final_reply(&TransferStatus::Completed(1), "Transfer complete.").starts_with("226 "));
        assert!(final_reply(&TransferStatus::Aborted(1), "x").starts_with("426 "));
        assert!(final_reply(&TransferStatus::Failed { side: Endpoint::Data, error: data }, "x").starts_with("426 "));
        assert!(final_reply(&TransferStatus::Failed { side: Endpoint::Local, error: local }, "x").starts_with("451 "));
    }
}
