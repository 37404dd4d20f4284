#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    NOOP,
    PWD,
    TYPE,
    PORT,
    PASV,
    EPSV,
    LIST,
    MLSD,
    CDUP,
    CWD,
    RETR,
    STOR,
    APPE,
    ABOR,
    DELE,
    REST,
    SIZE,
    MKD,
    RMD,
    RNFR,
    RNTO,
    SYST,
    FEAT,
    OPTS,
    HELP,
    SITE,
    AUTH,
    PBSZ,
    PROT,
}

impl FtpCommand {
    pub const ALL: [FtpCommand; 32] = [
        FtpCommand::USER,
        FtpCommand::PASS,
        FtpCommand::QUIT,
        FtpCommand::NOOP,
        FtpCommand::PWD,
        FtpCommand::TYPE,
        FtpCommand::PORT,
        FtpCommand::PASV,
        FtpCommand::EPSV,
        FtpCommand::LIST,
        FtpCommand::MLSD,
        FtpCommand::CDUP,
        FtpCommand::CWD,
        FtpCommand::RETR,
        FtpCommand::STOR,
        FtpCommand::APPE,
        FtpCommand::ABOR,
        FtpCommand::DELE,
        FtpCommand::REST,
        FtpCommand::SIZE,
        FtpCommand::MKD,
        FtpCommand::RMD,
        FtpCommand::RNFR,
        FtpCommand::RNTO,
        FtpCommand::SYST,
        FtpCommand::FEAT,
        FtpCommand::OPTS,
        FtpCommand::HELP,
        FtpCommand::SITE,
        FtpCommand::AUTH,
        FtpCommand::PBSZ,
        FtpCommand::PROT,
    ];

    pub fn parse(cmd: &str) -> Option<FtpCommand> {
        Self::ALL
            .iter()
            .copied()
            .find(|command| command.as_str().eq_ignore_ascii_case(cmd))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::NOOP => "NOOP",
            FtpCommand::PWD => "PWD",
            FtpCommand::TYPE => "TYPE",
            FtpCommand::PORT => "PORT",
            FtpCommand::PASV => "PASV",
            FtpCommand::EPSV => "EPSV",
            FtpCommand::LIST => "LIST",
            FtpCommand::MLSD => "MLSD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::CWD => "CWD",
            FtpCommand::RETR => "RETR",
            FtpCommand::STOR => "STOR",
            FtpCommand::APPE => "APPE",
            FtpCommand::ABOR => "ABOR",
            FtpCommand::DELE => "DELE",
            FtpCommand::REST => "REST",
            FtpCommand::SIZE => "SIZE",
            FtpCommand::MKD => "MKD",
            FtpCommand::RMD => "RMD",
            FtpCommand::RNFR => "RNFR",
            FtpCommand::RNTO => "RNTO",
            FtpCommand::SYST => "SYST",
            FtpCommand::FEAT => "FEAT",
            FtpCommand::OPTS => "OPTS",
            FtpCommand::HELP => "HELP",
            FtpCommand::SITE => "SITE",
            FtpCommand::AUTH => "AUTH",
            FtpCommand::PBSZ => "PBSZ",
            FtpCommand::PROT => "PROT",
        }
    }
}

/// Splits a control line into its verb and parameters.
///
/// The verb is the first run of ASCII letters, so Telnet IAC sequences some
/// clients put in front of ABOR are skipped. The parameters are everything
/// after the first space following the verb, kept verbatim so file names may
/// contain spaces.
pub fn parse_command_line(line: &str) -> (String, String) {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    let start = line
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(line.len());
    let rest = &line[start..];
    let verb_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let verb = rest[..verb_len].to_string();
    let params = rest[verb_len..]
        .strip_prefix(' ')
        .unwrap_or("")
        .to_string();
    (verb, params)
}
