pub mod alias;
pub mod cache;
pub mod config;
pub mod resolve;
