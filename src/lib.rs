pub mod config;
pub mod container;
#[cfg(feature = "network")]
pub mod download;
pub mod log;
pub mod unpack;
