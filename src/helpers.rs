use crate::config::Config;
use crate::core_error::FtpError;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Write side of a control connection, remembering when it was last used.
#[derive(Debug)]
pub struct ControlChannel {
    stream: OwnedWriteHalf,
    last_activity: Instant,
}

pub type ControlWriter = Arc<Mutex<ControlChannel>>;

impl ControlChannel {
    pub fn new(stream: OwnedWriteHalf) -> Self {
        Self {
            stream,
            last_activity: Instant::now(),
        }
    }

    pub fn into_writer(self) -> ControlWriter {
        Arc::new(Mutex::new(self))
    }

    pub async fn send(&mut self, message: &[u8]) -> Result<(), std::io::Error> {
        self.stream.write_all(message).await?;
        self.stream.flush().await?;
        self.last_activity = Instant::now();
        Ok(())
    }

    /// Records inbound traffic so keepalives only fire on a silent channel.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    pub async fn shutdown(&mut self) -> Result<(), std::io::Error> {
        self.stream.shutdown().await
    }
}

/// Sends a response to the client.
pub async fn send_response(writer: &ControlWriter, message: &[u8]) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.send(message).await
}

/// Sends the reply an [`FtpError`] maps to.
pub async fn respond_with_error(writer: &ControlWriter, error: &FtpError) -> Result<(), std::io::Error> {
    send_response(writer, error.to_ftp_response().as_bytes()).await
}

/// Formats a multi-line reply: `code-first`, indented body lines, `code last`.
pub fn multiline_reply(code: u16, first: &str, lines: &[&str], last: &str) -> String {
    let mut response = format!("{}-{}\r\n", code, first);
    for line in lines {
        response.push(' ');
        response.push_str(line);
        response.push_str("\r\n");
    }
    response.push_str(&format!("{} {}\r\n", code, last));
    response
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}:{}", config.server.listen_address, config.server.listen_port);
    info!("  Root Directory: {}", config.server.root_dir);
    info!("  Max Sessions: {}", config.server.max_sessions);
    info!(
        "  PASV Address: {}",
        config.server.pasv_address.as_deref().unwrap_or("<control connection address>")
    );
    match config.server.pasv_port_range() {
        Some((min, max)) => info!("  PASV Ports: {}-{}", min, max),
        None => info!("  PASV Ports: ephemeral"),
    }
    info!("  Transfer Buffer Size: {} bytes", config.server.buffer_size);
    info!("  Data Timeout: {}s", config.server.data_timeout_secs);
    info!("  Idle Timeout: {}s", config.server.idle_timeout_secs);
    match config.server.keepalive_interval() {
        Some(interval) => info!("  Transfer Keepalive: every {}s", interval.as_secs()),
        None => info!("  Transfer Keepalive: disabled"),
    }
    info!("  Account: {} ({})", config.account.username, config.account.access);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_reply_shape() {
        let reply = multiline_reply(211, "Features:", &["SIZE", "EPSV"], "End");
        assert_eq!(reply, "211-Features:\r\n SIZE\r\n EPSV\r\n211 End\r\n");
    }
}
