//! Transport layer for the HTTP gateway and one-shot CLI commands

pub mod cli;
pub mod http;
