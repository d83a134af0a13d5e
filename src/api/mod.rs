//! # API Module
//!
//! HTTP handlers of the local server that receives the OAuth redirect.
//!
//! - [`callback`] - validates the `state` parameter and hands the
//!   authorization code (or the denial reason) back to the waiting
//!   authorization flow in [`crate::spotify::auth`].

mod callback;

pub use callback::callback;
