pub mod auth;
pub mod billing;
pub mod config;
pub mod days;
pub mod error;
pub mod evaluate;
pub mod formatter;
pub mod models;
