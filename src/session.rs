use crate::config::ServerConfig;
use crate::core_auth::AccessLevel;
use crate::core_network::datachan::DataChannel;
use crate::core_path;
use crate::core_transfer::{spawn_transfer, TransferHandle, TransferJob};
use crate::helpers::ControlWriter;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Monotonically increasing id, only used to tag log lines.
pub fn next_session_id() -> u64 {
    SESSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Representation type set by TYPE. Bytes always go over the wire unchanged;
/// the type only shows up in replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    #[default]
    Ascii,
    Ebcdic,
    Image,
    Local(u8),
}

impl TransferType {
    /// Mode name used in 150 replies.
    pub fn mode_name(self) -> &'static str {
        match self {
            TransferType::Ascii => "ASCII",
            TransferType::Ebcdic => "EBCDIC",
            TransferType::Image | TransferType::Local(_) => "BINARY",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Ascii => f.write_str("A"),
            TransferType::Ebcdic => f.write_str("E"),
            TransferType::Image => f.write_str("I"),
            TransferType::Local(size) => write!(f, "L {}", size),
        }
    }
}

/// State of one control connection.
#[derive(Debug)]
pub struct Session {
    pub id: u64,
    pub access: AccessLevel,
    pub pending_username: Option<String>,
    pub root_dir: String,    // Canonical sandbox root, fixed for the session
    pub current_dir: String, // Absolute, always `root_dir` or below it
    pub rest_point: u64,
    pub data_channel: DataChannel,
    pub rename_from: Option<String>,
    pub transfer_type: TransferType,
    pub epsv_all: bool, // Set by EPSV ALL: only EPSV may set up data connections
    pub peer_addr: SocketAddr,
    pub local_addr: SocketAddr,
    pub idle_timeout: Duration,
    pub transfer: Option<TransferHandle>,
    transfer_buffer: Option<Vec<u8>>,
    buffer_size: usize,
}

impl Session {
    pub fn new(
        id: u64,
        root_dir: String,
        peer_addr: SocketAddr,
        local_addr: SocketAddr,
        config: &ServerConfig,
    ) -> Self {
        Self {
            id,
            access: AccessLevel::NotLoggedIn,
            pending_username: None,
            current_dir: root_dir.clone(),
            root_dir,
            rest_point: 0,
            data_channel: DataChannel::default(),
            rename_from: None,
            transfer_type: TransferType::default(),
            epsv_all: false,
            peer_addr,
            local_addr,
            idle_timeout: config.idle_timeout(),
            transfer: None,
            transfer_buffer: None,
            buffer_size: config.buffer_size,
        }
    }

    /// Resolves a client-supplied path inside this session's root.
    pub fn resolve(&self, param: &str) -> String {
        let param = (!param.is_empty()).then_some(param);
        core_path::resolve(&self.root_dir, &self.current_dir, param)
    }

    /// The client's view of an absolute path.
    pub fn virtual_path(&self, absolute: &str) -> String {
        core_path::virtual_path(&self.root_dir, absolute)
    }

    pub fn is_root(&self, absolute: &str) -> bool {
        self.virtual_path(absolute) == "/"
    }

    /// Spawns a transfer worker on this session's reusable buffer.
    pub fn start_transfer(&mut self, control: ControlWriter, config: &ServerConfig, job: TransferJob) {
        let buffer = self
            .transfer_buffer
            .take()
            .unwrap_or_else(|| vec![0; self.buffer_size]);
        self.transfer = Some(spawn_transfer(self.id, control, config, job, buffer));
    }

    pub fn restore_buffer(&mut self, buffer: Vec<u8>) {
        if buffer.len() == self.buffer_size {
            self.transfer_buffer = Some(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(root: &str) -> Session {
        let addr: SocketAddr = "127.0.0.1:21".parse().unwrap();
        Session::new(7, root.to_string(), addr, addr, &ServerConfig::default())
    }

    #[test]
    fn starts_unauthenticated_at_root() {
        let session = session("/srv/ftp");
        assert_eq!(session.access, AccessLevel::NotLoggedIn);
        assert_eq!(session.current_dir, "/srv/ftp");
        assert_eq!(session.rest_point, 0);
        assert!(!session.data_channel.is_configured());
        assert_eq!(session.transfer_type, TransferType::Ascii);
    }

    #[test]
    fn transfer_type_names() {
        assert_eq!(TransferType::Ascii.mode_name(), "ASCII");
        assert_eq!(TransferType::Image.mode_name(), "BINARY");
        assert_eq!(TransferType::Local(8).mode_name(), "BINARY");
        assert_eq!(TransferType::Local(8).to_string(), "L 8");
        assert_eq!(TransferType::Ebcdic.to_string(), "E");
    }

    #[test]
    fn resolve_uses_current_dir() {
        let mut session = session("/srv/ftp");
        session.current_dir = "/srv/ftp/logs".to_string();
        assert_eq!(session.resolve("today.txt"), "/srv/ftp/logs/today.txt");
        assert_eq!(session.resolve(""), "/srv/ftp/logs");
        assert_eq!(session.resolve("../../../.."), "/srv/ftp");
        assert_eq!(session.virtual_path(&session.current_dir), "/logs");
        assert!(session.is_root("/srv/ftp"));
    }

    #[test]
    fn session_ids_increase() {
        let first = next_session_id();
        let second = next_session_id();
        assert!(second > first);
    }
}
