use crate::config::Config;
use crate::core_network::datachan::{establish, DataMode};
use crate::helpers::{respond_with_error, ControlWriter};
use crate::session::Session;
use log::error;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// What a data command needs to open its data socket once the session lock
/// is released.
pub struct DataRequest {
    pub session_id: u64,
    pub mode: DataMode,
    pub peer_ip: IpAddr,
    pub wait: Duration,
}

/// Consumes the session's pending PORT/PASV endpoint.
pub fn take_data_request(session: &mut Session, config: &Config) -> DataRequest {
    DataRequest {
        session_id: session.id,
        mode: session.data_channel.take(),
        peer_ip: session.peer_addr.ip(),
        wait: config.server.data_timeout(),
    }
}

/// Opens the data socket, replying 425 on failure.
pub async fn open_data_connection(
    writer: &ControlWriter,
    request: DataRequest,
) -> Result<Option<TcpStream>, std::io::Error> {
    match establish(request.mode, request.peer_ip, request.wait).await {
        Ok(stream) => Ok(Some(stream)),
        Err(e) => {
            error!("[{}] {}", request.session_id, e);
            respond_with_error(writer, &e).await?;
            Ok(None)
        }
    }
}

/// Quotes a path for 257 replies, doubling embedded quotes.
pub fn quote_path(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_path_doubles_quotes() {
        assert_eq!(quote_path("/a"), "\"/a\"");
        assert_eq!(quote_path("/say \"hi\""), "\"/say \"\"hi\"\"\"");
    }
}
