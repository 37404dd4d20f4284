// src/constants.rs

pub const DEFAULT_CONFIG_PATH: &str = "/etc/microftpd.toml";

/// Written on the control channel while a long transfer keeps it otherwise
/// silent, when `keepalive_interval_secs` enables it.
pub const KEEPALIVE_LINE: &[u8] = b"\r\n";

/// Bounds accepted by `SITE IDLE`, in seconds.
pub const MIN_IDLE_SECS: u64 = 30;
pub const MAX_IDLE_SECS: u64 = 7200;

/// LIST shows the year instead of the time for entries older than this.
pub const LIST_RECENT_SECS: i64 = 180 * 24 * 60 * 60;

pub const FEATURES: &[&str] = &[
    "SIZE",
    "REST STREAM",
    "MLST type*;size*;modify*;",
    "EPSV",
    "PASV",
    "UTF8",
];

/// Longest control line accepted, terminator included.
pub const MAX_COMMAND_LINE: usize = 4096;

/// Commands held back while a transfer runs; more are refused with 503.
pub const MAX_PENDING_COMMANDS: usize = 16;
