//! Common utilities shared across faver crates.
//!
//! Kept deliberately small so that every crate in the workspace (including
//! integration tests) can depend on it without dragging in the HTTP stack.
//!
//! # Overview
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`observability::LogFormat`]: log encoding, also used by `faver-config`
//!
//! # Examples
//!
//! ```rust
//! use faver_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, "faver");
//! assert!(cfg.emit_stderr);
//! ```

pub mod observability;
