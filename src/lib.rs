pub mod charts;
pub mod config;
pub mod data;
pub mod filter;
pub mod layout;
pub mod logging;
pub mod server;
pub mod session;
