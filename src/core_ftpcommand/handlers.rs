use crate::config::Config;
use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::{parse_command_line, FtpCommand};
use crate::core_ftpcommand::{
    abor, cdup, cwd, dele, feat, help, list, mkd, mlsd, noop, opts, pass, pwd, quit, rest, retr, rmd, rnfr, rnto,
    security, site, size, stor, syst, type_, user,
};
use crate::core_network::{pasv, port};
use crate::helpers::{respond_with_error, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

type CommandHandler = Box<
    dyn Fn(
            ControlWriter,
            Arc<Config>,
            Arc<Mutex<Session>>,
            String, // Parameters after the verb
        ) -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>
        + Send
        + Sync,
>;

fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(ControlWriter, Arc<Config>, Arc<Mutex<Session>>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), std::io::Error>> + Send + 'static,
{
    Box::new(move |writer, config, session, arg| Box::pin(f(writer, config, session, arg)))
}

/// Built once, read-only for the life of the process.
static COMMAND_HANDLERS: Lazy<HashMap<FtpCommand, CommandHandler>> = Lazy::new(initialize_command_handlers);

pub fn initialize_command_handlers() -> HashMap<FtpCommand, CommandHandler> {
    let mut handlers: HashMap<FtpCommand, CommandHandler> = HashMap::new();

    handlers.insert(FtpCommand::USER, handler(user::handle_user_command));
    handlers.insert(FtpCommand::PASS, handler(pass::handle_pass_command));
    handlers.insert(FtpCommand::QUIT, handler(quit::handle_quit_command));
    handlers.insert(FtpCommand::NOOP, handler(noop::handle_noop_command));
    handlers.insert(FtpCommand::PWD, handler(pwd::handle_pwd_command));
    handlers.insert(FtpCommand::TYPE, handler(type_::handle_type_command));
    handlers.insert(FtpCommand::PORT, handler(port::handle_port_command));
    handlers.insert(FtpCommand::PASV, handler(pasv::handle_pasv_command));
    handlers.insert(FtpCommand::EPSV, handler(pasv::handle_epsv_command));
    handlers.insert(FtpCommand::LIST, handler(list::handle_list_command));
    handlers.insert(FtpCommand::MLSD, handler(mlsd::handle_mlsd_command));
    handlers.insert(FtpCommand::CDUP, handler(cdup::handle_cdup_command));
    handlers.insert(FtpCommand::CWD, handler(cwd::handle_cwd_command));
    handlers.insert(FtpCommand::RETR, handler(retr::handle_retr_command));
    handlers.insert(FtpCommand::STOR, handler(stor::handle_stor_command));
    handlers.insert(FtpCommand::APPE, handler(stor::handle_appe_command));
    handlers.insert(FtpCommand::ABOR, handler(abor::handle_abor_command));
    handlers.insert(FtpCommand::DELE, handler(dele::handle_dele_command));
    handlers.insert(FtpCommand::REST, handler(rest::handle_rest_command));
    handlers.insert(FtpCommand::SIZE, handler(size::handle_size_command));
    handlers.insert(FtpCommand::MKD, handler(mkd::handle_mkd_command));
    handlers.insert(FtpCommand::RMD, handler(rmd::handle_rmd_command));
    handlers.insert(FtpCommand::RNFR, handler(rnfr::handle_rnfr_command));
    handlers.insert(FtpCommand::RNTO, handler(rnto::handle_rnto_command));
    handlers.insert(FtpCommand::SYST, handler(syst::handle_syst_command));
    handlers.insert(FtpCommand::FEAT, handler(feat::handle_feat_command));
    handlers.insert(FtpCommand::OPTS, handler(opts::handle_opts_command));
    handlers.insert(FtpCommand::HELP, handler(help::handle_help_command));
    handlers.insert(FtpCommand::SITE, handler(site::handle_site_command));
    handlers.insert(FtpCommand::AUTH, handler(security::handle_security_command));
    handlers.insert(FtpCommand::PBSZ, handler(security::handle_security_command));
    handlers.insert(FtpCommand::PROT, handler(security::handle_security_command));

    handlers
}

/// A restart point only survives until the next command that is not a
/// transfer or another REST.
pub fn keeps_restart_point(command: FtpCommand) -> bool {
    matches!(
        command,
        FtpCommand::REST | FtpCommand::RETR | FtpCommand::STOR | FtpCommand::APPE
    )
}

/// Runs one control line. Returns `false` once the session should end.
pub async fn dispatch_command(
    writer: &ControlWriter,
    config: &Arc<Config>,
    session: &Arc<Mutex<Session>>,
    line: &str,
) -> Result<bool, std::io::Error> {
    let (verb, arg) = parse_command_line(line);
    let parsed = FtpCommand::parse(&verb);
    let id = {
        let mut session = session.lock().await;
        if !parsed.is_some_and(keeps_restart_point) {
            session.rest_point = 0;
        }
        session.id
    };

    let command = match parsed {
        Some(command) => command,
        None => {
            warn!("[{}] Unknown command: {:?}", id, line.trim_end());
            respond_with_error(writer, &FtpError::UnknownCommand(verb)).await?;
            return Ok(true);
        }
    };

    if command == FtpCommand::PASS {
        info!("[{}] Received command: PASS ****", id);
    } else {
        info!("[{}] Received command: {} {}", id, command.as_str(), arg);
    }

    if let Some(handler) = COMMAND_HANDLERS.get(&command) {
        handler(Arc::clone(writer), Arc::clone(config), Arc::clone(session), arg).await?;
    }

    Ok(command != FtpCommand::QUIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_handler() {
        let handlers = initialize_command_handlers();
        for command in FtpCommand::ALL {
            assert!(handlers.contains_key(&command), "{:?} has no handler", command);
        }
    }

    #[test]
    fn only_transfers_keep_the_restart_point() {
        for command in [FtpCommand::REST, FtpCommand::RETR, FtpCommand::STOR, FtpCommand::APPE] {
            assert!(keeps_restart_point(command));
        }
        for command in [FtpCommand::PWD, FtpCommand::SIZE, FtpCommand::PASV, FtpCommand::LIST] {
            assert!(!keeps_restart_point(command));
        }
    }
}
