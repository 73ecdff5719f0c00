pub mod catalog;
pub mod cli;
pub mod config;
pub mod demos;
pub mod error;
pub mod mcp;
pub mod runner;
pub mod ui;
