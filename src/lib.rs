pub mod auth;
pub mod bank;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod runtime;
pub mod transfer;
