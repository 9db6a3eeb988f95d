//! Google Sheets implementation of the store gateway.
//!
//! Only compiled with the `sheets` feature. Credential acquisition is not
//! handled here: callers supply a ready OAuth bearer token.

pub mod client;
pub mod types;

pub use client::*;
