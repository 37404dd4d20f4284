pub mod datachan;
pub mod lines;
pub mod network;
pub mod pasv;
pub mod port;
