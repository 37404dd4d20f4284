use crate::config::Config;
use crate::core_auth::{check_access, AccessLevel};
use crate::core_ftpcommand::cwd::change_directory;
use crate::helpers::{respond_with_error, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// CDUP is CWD to the parent; at the root it stays at the root.
pub async fn handle_cdup_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    if let Err(e) = check_access(&session, AccessLevel::ReadOnly) {
        return respond_with_error(&writer, &e).await;
    }

    change_directory(&writer, &mut session, "..").await
}
