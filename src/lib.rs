pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
