pub mod clear;
pub mod config;
pub mod prompts;
pub mod watch;
