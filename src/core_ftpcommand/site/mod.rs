mod handler;

pub mod site_help;
pub mod site_idle;

pub use handler::handle_site_command;
