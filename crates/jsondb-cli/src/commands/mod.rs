//! Command handlers

pub mod config;
pub mod database;
pub mod record;
pub mod table;
