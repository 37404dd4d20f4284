use crate::core_error::FtpError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission tier of a session. The derived ordering is the gate ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    NotLoggedIn,
    ReadOnly,
    CreateNew,
    Full,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessLevel::NotLoggedIn => "not-logged-in",
            AccessLevel::ReadOnly => "read-only",
            AccessLevel::CreateNew => "create-new",
            AccessLevel::Full => "full",
        };
        f.write_str(name)
    }
}

/// Checks that the session holds at least `required`.
///
/// A session that never logged in gets `NotLoggedIn` (530) whatever the
/// requirement; a logged-in session below the requirement gets
/// `PermissionDenied` (550).
pub fn check_access(session: &Session, required: AccessLevel) -> Result<(), FtpError> {
    check_level(session.access, required)
}

pub fn check_level(current: AccessLevel, required: AccessLevel) -> Result<(), FtpError> {
    if current >= required {
        Ok(())
    } else if current == AccessLevel::NotLoggedIn {
        Err(FtpError::NotLoggedIn)
    } else {
        Err(FtpError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AccessLevel::NotLoggedIn < AccessLevel::ReadOnly);
        assert!(AccessLevel::ReadOnly < AccessLevel::CreateNew);
        assert!(AccessLevel::CreateNew < AccessLevel::Full);
    }

    #[test]
    fn not_logged_in_is_rejected_with_530() {
        let err = check_level(AccessLevel::NotLoggedIn, AccessLevel::Full).unwrap_err();
        assert!(err.to_ftp_response().starts_with("530"));
        assert!(check_level(AccessLevel::NotLoggedIn, AccessLevel::NotLoggedIn).is_ok());
    }

    #[test]
    fn insufficient_level_is_rejected_with_550() {
        let err = check_level(AccessLevel::ReadOnly, AccessLevel::Full).unwrap_err();
        assert!(err.to_ftp_response().starts_with("550"));
        let err = check_level(AccessLevel::ReadOnly, AccessLevel::CreateNew).unwrap_err();
        assert!(err.to_ftp_response().starts_with("550"));
    }

    #[test]
    fn sufficient_level_passes() {
        assert!(check_level(AccessLevel::Full, AccessLevel::CreateNew).is_ok());
        assert!(check_level(AccessLevel::CreateNew, AccessLevel::CreateNew).is_ok());
        assert!(check_level(AccessLevel::ReadOnly, AccessLevel::ReadOnly).is_ok());
    }
}
