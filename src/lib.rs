//! CDP client, session registry and multi-source DOM/AX/snapshot merger
//! that turns a live Chrome page into an indexed, LLM-facing inventory of
//! actionable elements.
//!
//! [`Browser`] is the entry point most callers want: it owns a [`Client`],
//! drives the collector/merger/serializer pipeline on every [`get_state`]
//! call, and resolves action-by-index requests back onto the page.
//!
//! [`Browser`]: browser::Browser
//! [`Client`]: client::Client
//! [`get_state`]: browser::Browser::get_state

pub mod client;
pub mod codec;
pub mod collector;
pub mod config;
pub mod error;
pub mod handler;
pub mod keys;
pub mod merger;
pub mod registry;
pub mod serializer;
pub mod transport;

pub mod browser;

pub use browser::{ActionKind, ActionResult, Browser, BrowserState};
pub use client::{Client, ScrollDirection, SelectBy};
pub use config::{BrowserConfig, ScreenshotFormat};
pub use error::{CdpError, ErrorKind, Result};
pub use keys::Modifier;
pub use merger::{ActionType, EnhancedNode, SelectorEntry, SelectorMap};
