use crate::config::AccountConfig;
use crate::core_auth::AccessLevel;
use bcrypt::verify;
use log::warn;

pub fn is_bcrypt_hash(password: &str) -> bool {
    password.starts_with("$2")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    if is_bcrypt_hash(stored) {
        match verify(password, stored) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Stored bcrypt hash could not be checked: {}", e);
                false
            }
        }
    } else {
        password == stored
    }
}

/// Maps a (username, password) pair to the access level it grants.
///
/// Only the single configured account can log in; anything else is
/// `NotLoggedIn`. An account with an empty password never matches.
pub fn authenticate(account: &AccountConfig, username: &str, password: &str) -> AccessLevel {
    if account.password.is_empty() || username != account.username {
        return AccessLevel::NotLoggedIn;
    }
    if verify_password(password, &account.password) {
        account.access
    } else {
        AccessLevel::NotLoggedIn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(password: &str, access: AccessLevel) -> AccountConfig {
        AccountConfig {
            username: "esp".to_string(),
            password: password.to_string(),
            access,
        }
    }

    #[test]
    fn plain_password_grants_configured_level() {
        let account = account("secret", AccessLevel::CreateNew);
        assert_eq!(authenticate(&account, "esp", "secret"), AccessLevel::CreateNew);
    }

    #[test]
    fn wrong_user_or_password_is_rejected() {
        let account = account("secret", AccessLevel::Full);
        assert_eq!(authenticate(&account, "esp", "guess"), AccessLevel::NotLoggedIn);
        assert_eq!(authenticate(&account, "other", "secret"), AccessLevel::NotLoggedIn);
    }

    #[test]
    fn empty_configured_password_never_matches() {
        let account = account("", AccessLevel::Full);
        assert_eq!(authenticate(&account, "esp", ""), AccessLevel::NotLoggedIn);
    }

    #[test]
    fn bcrypt_hash_is_verified() {
        let hashed = bcrypt::hash("secret", 4).unwrap();
        let account = account(&hashed, AccessLevel::Full);
        assert_eq!(authenticate(&account, "esp", "secret"), AccessLevel::Full);
        assert_eq!(authenticate(&account, "esp", "nope"), AccessLevel::NotLoggedIn);
    }
}
