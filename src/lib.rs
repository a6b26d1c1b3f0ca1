//! # TalkAI Proxy
//!
//! An OpenAI-compatible chat-completions gateway in front of the TalkAI
//! backend, which speaks an incompatible line-oriented streaming protocol.
//!
//! ## Overview
//!
//! This library provides the core functionality for translating between:
//! - **OpenAI Chat Completions API** - Client-facing format
//! - **TalkAI chat protocol** - Backend format (`messagesHistory` + settings)
//!
//! The gateway handles:
//! - Request translation, including system-prompt folding
//! - Real-time reframing of the backend line protocol into SSE chunks
//! - Consolidated (non-streaming) responses from the same byte stream
//! - Bearer-key authentication and live request statistics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use talkai_proxy::config::ProxyConfig;
//! use talkai_proxy::handler::build_router;
//! use talkai_proxy::state::AppState;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProxyConfig::from_env()?;
//! let state = Arc::new(AppState::new(config)?);
//! let app = build_router(state);
//! // Serve `app` with axum::serve; see src/main.rs.
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and handling
//! - [`models`] - Data structures for the OpenAI and TalkAI protocols
//! - [`streaming`] - Backend line parser and SSE chunk generator
//! - [`transform`] - Request translation logic
//! - [`handler`] - Axum handlers, middleware, and router assembly

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod models;
pub mod state;
pub mod streaming;
pub mod transform;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
