use crate::config::Config;
use crate::constants::{MAX_IDLE_SECS, MIN_IDLE_SECS};
use crate::core_error::FtpError;
use crate::helpers::{respond_with_error, send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Parses a SITE IDLE argument, bounded to the accepted range.
pub fn parse_idle_seconds(arg: &str) -> Option<u64> {
    arg.parse::<u64>()
        .ok()
        .filter(|secs| (MIN_IDLE_SECS..=MAX_IDLE_SECS).contains(secs))
}

/// Without an argument reports the session's idle limit, otherwise replaces it.
pub async fn handle_site_idle_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    args: Vec<String>,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;

    let Some(arg) = args.first() else {
        let reply = format!(
            "200 Current idle time limit is {} seconds.\r\n",
            session.idle_timeout.as_secs()
        );
        return send_response(&writer, reply.as_bytes()).await;
    };

    match parse_idle_seconds(arg) {
        Some(secs) => {
            session.idle_timeout = Duration::from_secs(secs);
            info!("[{}] Idle timeout set to {}s", session.id, secs);
            let reply = format!("200 Maximum idle time set to {} seconds.\r\n", secs);
            send_response(&writer, reply.as_bytes()).await
        }
        None => {
            let message = format!("Idle time must be between {} and {} seconds", MIN_IDLE_SECS, MAX_IDLE_SECS);
            respond_with_error(&writer, &FtpError::Syntax(message)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_bounds() {
        assert_eq!(parse_idle_seconds("30"), Some(30));
        assert_eq!(parse_idle_seconds("7200"), Some(7200));
        assert_eq!(parse_idle_seconds("29"), None);
        assert_eq!(parse_idle_seconds("7201"), None);
        assert_eq!(parse_idle_seconds("soon"), None);
    }
}
