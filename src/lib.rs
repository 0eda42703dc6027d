//! arena-gateway: HTTP gateway that routes chat messages to pluggable agents
//!
//! This library provides:
//! - Agents with bounded per-conversation history (plain chat and tool-augmented)
//! - An OpenAI-compatible Chat Completions client
//! - A registry that dispatches messages to agents by name
//! - An axum HTTP gateway and one-shot CLI commands

pub mod agent;
pub mod config;
pub mod llm;
pub mod registry;
pub mod tools;
pub mod transport;
pub mod utils;

pub use agent::Agent;
pub use config::Config;
pub use registry::{AgentRegistry, RegistryError};

/// Crate version with the build suffix (`-dev.<hash>` outside tagged releases)
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), env!("ARENA_VERSION_SUFFIX"));
