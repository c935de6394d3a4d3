pub mod config;
pub mod dates;
pub mod domain;
pub mod error;
pub mod filter;
pub mod output;
pub mod paths;
pub mod plan;
pub mod resolve;
pub mod shell;
pub mod upload;
