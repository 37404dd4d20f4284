use crate::config::Config;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::helpers::{multiline_reply, send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn help_text() -> String {
    let verbs: Vec<&str> = FtpCommand::ALL.iter().map(FtpCommand::as_str).collect();
    let lines: Vec<String> = verbs.chunks(8).map(|chunk| chunk.join(" ")).collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    multiline_reply(214, "The following commands are recognized:", &lines, "Help OK.")
}

pub async fn handle_help_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_response(&writer, help_text().as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_verb() {
        let text = help_text();
        assert!(text.starts_with("214-"));
        assert!(text.ends_with("214 Help OK.\r\n"));
        for command in FtpCommand::ALL {
            assert!(text.contains(command.as_str()));
        }
    }
}
