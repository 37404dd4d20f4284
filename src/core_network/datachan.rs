//! Data connection bookkeeping: one pending data endpoint per session, consumed
//! by exactly one transfer.

use crate::core_error::FtpError;
use log::{debug, warn};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

#[derive(Debug, Default)]
pub enum DataMode {
    #[default]
    None,
    /// PORT: connect out to the client's listener.
    Active(SocketAddr),
    /// PASV/EPSV: accept once on our own listener.
    Passive(TcpListener),
}

#[derive(Debug, Default)]
pub struct DataChannel {
    mode: DataMode,
}

impl DataChannel {
    /// Drops whatever endpoint is pending, closing a passive listener.
    pub fn reset(&mut self) {
        if let DataMode::Passive(listener) = &self.mode {
            debug!("Closing unused passive listener {:?}", listener.local_addr().ok());
        }
        self.mode = DataMode::None;
    }

    pub fn set_active(&mut self, addr: SocketAddr) {
        self.reset();
        self.mode = DataMode::Active(addr);
    }

    pub fn set_passive(&mut self, listener: TcpListener) {
        self.reset();
        self.mode = DataMode::Passive(listener);
    }

    /// Hands the pending endpoint to a transfer and returns to `None`.
    pub fn take(&mut self) -> DataMode {
        std::mem::take(&mut self.mode)
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.mode, DataMode::None)
    }

    pub fn passive_port(&self) -> Option<u16> {
        match &self.mode {
            DataMode::Passive(listener) => listener.local_addr().ok().map(|addr| addr.port()),
            _ => None,
        }
    }
}

/// Opens the data socket for one transfer.
///
/// Active mode connects to the stored address; passive mode accepts a single
/// connection and closes the listener. Both are bounded by `wait`. A passive
/// connection from a host other than the control peer is refused.
pub async fn establish(mode: DataMode, control_peer: IpAddr, wait: Duration) -> Result<TcpStream, FtpError> {
    match mode {
        DataMode::None => Err(FtpError::DataConnection("no PORT, PASV or EPSV issued".to_string())),
        DataMode::Active(addr) => match timeout(wait, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                debug!("Active data connection established with {}", addr);
                Ok(stream)
            }
            Ok(Err(e)) => Err(FtpError::DataConnection(format!("connect to {} failed: {}", addr, e))),
            Err(_) => Err(FtpError::DataConnection(format!("connect to {} timed out", addr))),
        },
        DataMode::Passive(listener) => {
            let accepted = timeout(wait, listener.accept()).await;
            drop(listener);
            match accepted {
                Ok(Ok((stream, peer))) => {
                    if !same_host(peer.ip(), control_peer) {
                        warn!(
                            "Passive data connection from {} does not match control peer {}",
                            peer, control_peer
                        );
                        return Err(FtpError::DataConnection(format!("unexpected peer {}", peer)));
                    }
                    debug!("Passive data connection accepted from {}", peer);
                    Ok(stream)
                }
                Ok(Err(e)) => Err(FtpError::DataConnection(format!("accept failed: {}", e))),
                Err(_) => Err(FtpError::DataConnection("no connection on passive port".to_string())),
            }
        }
    }
}

/// Address equality that treats IPv4-mapped IPv6 addresses as their IPv4 form.
pub fn same_host(a: IpAddr, b: IpAddr) -> bool {
    canonical_ip(a) == canonical_ip(b)
}

pub fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        IpAddr::V4(_) => ip,
    }
}
