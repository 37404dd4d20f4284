// Reply mapping for everything a command handler can fail with.
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command line too long")]
    LineTooLong,

    #[error("Syntax error in parameters: {0}")]
    Syntax(String),

    #[error("Bad sequence of commands: {0}")]
    BadSequence(String),

    #[error("Unsupported parameter: {0}")]
    Unsupported(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Login incorrect")]
    LoginIncorrect,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("File unavailable: {0}")]
    FileUnavailable(#[source] io::Error),

    #[error("Can't open data connection: {0}")]
    DataConnection(String),

    #[error("Transfer aborted")]
    Aborted,

    #[error("Local error in processing: {0}")]
    Local(String),
}

impl FtpError {
    pub fn code(&self) -> u16 {
        match self {
            FtpError::UnknownCommand(_) | FtpError::LineTooLong => 500,
            FtpError::Syntax(_) => 501,
            FtpError::BadSequence(_) => 503,
            FtpError::Unsupported(_) => 504,
            FtpError::NotLoggedIn | FtpError::LoginIncorrect => 530,
            FtpError::PermissionDenied | FtpError::FileUnavailable(_) => 550,
            FtpError::DataConnection(_) => 425,
            FtpError::Aborted => 426,
            FtpError::Local(_) => 451,
        }
    }

    pub fn to_ftp_response(&self) -> String {
        let text = match self {
            FtpError::UnknownCommand(_) => "Unknown command.".to_string(),
            FtpError::LineTooLong => "Command line too long.".to_string(),
            FtpError::Syntax(detail) => format!("Syntax error in parameters or arguments: {}.", detail),
            FtpError::BadSequence(detail) => format!("Bad sequence of commands: {}.", detail),
            FtpError::Unsupported(detail) => format!("Command not implemented for that parameter: {}.", detail),
            FtpError::NotLoggedIn => "Not logged in.".to_string(),
            FtpError::LoginIncorrect => "Login incorrect.".to_string(),
            FtpError::PermissionDenied => "Permission denied.".to_string(),
            FtpError::FileUnavailable(_) => "Requested action not taken (file unavailable or not accessible).".to_string(),
            FtpError::DataConnection(_) => "Can't open data connection.".to_string(),
            FtpError::Aborted => "Connection closed; transfer aborted.".to_string(),
            FtpError::Local(_) => "Requested action aborted. Local error in processing.".to_string(),
        };
        format!("{} {}\r\n", self.code(), text)
    }
}
