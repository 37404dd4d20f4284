pub mod listing;
pub mod worker;

pub use listing::{read_listing, ListEntry, ListFormat};
pub use worker::{spawn_transfer, TransferHandle, TransferJob};
