pub mod access;
pub mod helper;

pub use access::{check_access, AccessLevel};
pub use helper::authenticate;
