//! The RFC 3659 Machine List Directory (`MLSD`) command.

use crate::config::Config;
use crate::core_ftpcommand::list::start_listing;
use crate::core_transfer::ListFormat;
use crate::helpers::ControlWriter;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_mlsd_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    start_listing(writer, config, session, &arg, ListFormat::Machine).await
}
