//! Library crate for userdesk.
//!
//! This crate exposes the building blocks of the TUI:
//! - REST API client and error taxonomy (`api`)
//! - Application state and update loop (`app`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userdesk` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
pub use api::{ApiClient, ApiError, User, UserApi};
