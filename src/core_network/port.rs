use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::core_network::datachan::same_host;
use crate::core_network::pasv::refuse_after_epsv_all;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Parses the `h1,h2,h3,h4,p1,p2` argument of PORT.
pub fn parse_port_argument(arg: &str) -> Result<SocketAddrV4, FtpError> {
    let parts: Vec<&str> = arg.trim().split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(FtpError::Syntax("PORT expects h1,h2,h3,h4,p1,p2".to_string()));
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        *octet = part
            .parse::<u8>()
            .map_err(|_| FtpError::Syntax(format!("invalid PORT field '{}'", part)))?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (octets[4] as u16) << 8 | octets[5] as u16;
    if port == 0 {
        return Err(FtpError::Syntax("PORT port must not be 0".to_string()));
    }
    Ok(SocketAddrV4::new(ip, port))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the client's address; the connection itself is opened when
/// the next data command runs. The address must belong to the control peer.
pub async fn handle_port_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }
    if let Err(e) = refuse_after_epsv_all(&session, "PORT") {
        return respond_with_error(&writer, &e).await;
    }

    let addr = match parse_port_argument(&arg) {
        Ok(addr) => addr,
        Err(e) => {
            warn!("[{}] Rejected PORT argument '{}': {}", session.id, arg, e);
            return respond_with_error(&writer, &e).await;
        }
    };

    let peer_ip = session.peer_addr.ip();
    if !same_host(IpAddr::V4(*addr.ip()), peer_ip) {
        warn!(
            "[{}] PORT address {} does not match control peer {}",
            session.id,
            addr.ip(),
            peer_ip
        );
        session.data_channel.reset();
        return respond_with_error(
            &writer,
            &FtpError::Syntax("PORT address does not match originator".to_string()),
        )
        .await;
    }

    info!("[{}] Active mode data address set to {}", session.id, addr);
    session.data_channel.set_active(SocketAddr::V4(addr));
    send_response(&writer, b"200 PORT command successful.\r\n").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_address_and_port() {
        let addr = parse_port_argument("192,168,4,2,195,80").unwrap();
        assert_eq!(*addr.ip(), Ipv4Addr::new(192, 168, 4, 2));
        assert_eq!(addr.port(), 195 * 256 + 80);
    }

    #[test]
    fn tolerates_spaces_around_fields() {
        let addr = parse_port_argument(" 127, 0, 0, 1, 4, 1 ").unwrap();
        assert_eq!(addr.port(), 1025);
    }

    #[test]
    fn rejects_malformed_arguments() {
        for arg in ["", "1,2,3,4,5", "1,2,3,4,5,6,7", "256,0,0,1,4,1", "a,b,c,d,e,f", "127,0,0,1,0,0"] {
            let err = parse_port_argument(arg).unwrap_err();
            assert_eq!(err.code(), 501, "{}", arg);
        }
    }
}
