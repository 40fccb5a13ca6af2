//! # TaskDesk Worker Library
//!
//! The daily reminder job and everything it needs.
//!
//! ## Modules
//!
//! - `config`: Worker configuration from the environment
//! - `notifier`: Outbound notification channels (log, webhook, mock)
//! - `reminder`: Due-task grouping, rendering and dispatch
//! - `scheduler`: Daily UTC trigger with graceful shutdown

pub mod config;
pub mod notifier;
pub mod reminder;
pub mod scheduler;
