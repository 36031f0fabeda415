//! Automated portal session driving and table extraction, exposed over a
//! small HTTP API.
//!
//! Each request owns exactly one browser session: open, login, extract
//! when authenticated, and the session is always torn down before the
//! request returns. The extractor converts a table of unknown shape into
//! ordered key-value records, synthesizing column labels when the table
//! carries no usable headers.

pub mod config;
pub mod error;
pub mod models;
pub mod scraper;
pub mod server;
