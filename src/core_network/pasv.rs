use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_error::FtpError;
use crate::core_network::datachan::canonical_ip;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::{debug, error, info};
use rand::Rng;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Binds a fresh passive listener on `bind_ip`.
///
/// With a configured range every port in it is tried once, starting from a
/// random offset; otherwise the OS picks an ephemeral port.
pub async fn setup_pasv_listener(bind_ip: IpAddr, range: Option<(u16, u16)>) -> Result<TcpListener, std::io::Error> {
    let (min, max) = match range {
        Some(range) => range,
        None => return TcpListener::bind((bind_ip, 0)).await,
    };

    let span = (max - min) as u32 + 1;
    let start = rand::thread_rng().gen_range(0..span);
    let mut last_error = None;
    for step in 0..span {
        let port = min + ((start + step) % span) as u16;
        match TcpListener::bind((bind_ip, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrInUse, "passive port range exhausted")
    }))
}

pub fn format_pasv_reply(ip: Ipv4Addr, port: u16) -> String {
    let [a, b, c, d] = ip.octets();
    format!(
        "227 Entering Passive Mode ({},{},{},{},{},{}).\r\n",
        a,
        b,
        c,
        d,
        port / 256,
        port % 256
    )
}

pub fn format_epsv_reply(port: u16) -> String {
    format!("229 Entering Extended Passive Mode (|||{}|)\r\n", port)
}

/// Address announced in 227 replies: the configured public address, or the
/// local side of the control connection.
fn announced_ipv4(config: &Config, session: &Session) -> Result<Ipv4Addr, FtpError> {
    if let Some(address) = &config.server.pasv_address {
        return address
            .parse::<Ipv4Addr>()
            .map_err(|e| FtpError::DataConnection(format!("invalid pasv_address '{}': {}", address, e)));
    }
    match canonical_ip(session.local_addr.ip()) {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(_) => Err(FtpError::DataConnection("PASV needs IPv4, use EPSV".to_string())),
    }
}

/// After EPSV ALL only EPSV may set up a data connection (RFC 2428).
pub fn refuse_after_epsv_all(session: &Session, verb: &str) -> Result<(), FtpError> {
    if session.epsv_all {
        Err(FtpError::BadSequence(format!("{} not allowed after EPSV ALL", verb)))
    } else {
        Ok(())
    }
}

/// Sets up a passive mode (PASV) listener and sends the response to the client.
pub async fn handle_pasv_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }
    if let Err(e) = refuse_after_epsv_all(&session, "PASV") {
        return respond_with_error(&writer, &e).await;
    }
    session.data_channel.reset();

    let announce = match announced_ipv4(&config, &session) {
        Ok(ip) => ip,
        Err(e) => {
            error!("[{}] PASV failed: {}", session.id, e);
            return respond_with_error(&writer, &e).await;
        }
    };

    let listener = match setup_pasv_listener(session.local_addr.ip(), config.server.pasv_port_range()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("[{}] Failed to bind passive listener: {}", session.id, e);
            return respond_with_error(&writer, &FtpError::DataConnection(e.to_string())).await;
        }
    };
    let port = listener.local_addr()?.port();
    session.data_channel.set_passive(listener);

    let response = format_pasv_reply(announce, port);
    info!("[{}] Passive mode on {}:{}", session.id, announce, port);
    debug!("PASV response sent to client: {}", response.trim_end());
    send_response(&writer, response.as_bytes()).await
}

/// Handles EPSV: like PASV, but the reply only carries the port.
pub async fn handle_epsv_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    match arg.trim().to_ascii_uppercase().as_str() {
        "" | "1" | "2" => {}
        "ALL" => {
            session.epsv_all = true;
            info!("[{}] EPSV ALL: PORT and PASV now refused", session.id);
            return send_response(&writer, b"200 EPSV ALL command successful.\r\n").await;
        }
        other => {
            return respond_with_error(&writer, &FtpError::Unsupported(format!("network protocol {}", other))).await;
        }
    }
    session.data_channel.reset();

    let listener = match setup_pasv_listener(session.local_addr.ip(), config.server.pasv_port_range()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("[{}] Failed to bind extended passive listener: {}", session.id, e);
            return respond_with_error(&writer, &FtpError::DataConnection(e.to_string())).await;
        }
    };
    let port = listener.local_addr()?.port();
    session.data_channel.set_passive(listener);

    info!("[{}] Extended passive mode on port {}", session.id, port);
    send_response(&writer, format_epsv_reply(port).as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasv_reply_splits_port_into_bytes() {
        let reply = format_pasv_reply(Ipv4Addr::new(192, 168, 4, 1), 50_123);
        assert_eq!(reply, "227 Entering Passive Mode (192,168,4,1,195,203).\r\n");
    }

    #[test]
    fn epsv_reply_carries_port_only() {
        assert_eq!(format_epsv_reply(40000), "229 Entering Extended Passive Mode (|||40000|)\r\n");
    }

    #[tokio::test]
    async fn listener_stays_inside_configured_range() {
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let free_port = {
            let spare = TcpListener::bind((ip, 0)).await.unwrap();
            spare.local_addr().unwrap().port()
        };

        let listener = setup_pasv_listener(ip, Some((free_port, free_port))).await.unwrap();
        assert_eq!(listener.local_addr().unwrap().port(), free_port);

        // The only port in the range is taken now.
        assert!(setup_pasv_listener(ip, Some((free_port, free_port))).await.is_err());
    }

    #[tokio::test]
    async fn ephemeral_listener_without_range() {
        let listener = setup_pasv_listener(IpAddr::V4(Ipv4Addr::LOCALHOST), None).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
