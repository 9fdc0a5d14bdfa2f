//! `handover` - IT asset handover forms
//!
//! This library stores handover submissions in SQLite, mails IT staff about
//! each new one, renders printable PDF acknowledgment forms and serves all of
//! it over HTTP.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod notify;
pub mod record;
pub mod storage;
pub mod web;

pub use config::Config;
pub use document::{render, RenderedDocument};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use notify::{Delivery, Notifier};
pub use record::{Field, HandoverFields, HandoverRecord};
pub use storage::Storage;
