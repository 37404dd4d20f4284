pub mod resolver;

pub use resolver::{resolve, virtual_path};
