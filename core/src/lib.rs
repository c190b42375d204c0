//! Core components for signing and dispatching inference requests.
//!
//! This crate provides the foundational types shared by the bedsign crates:
//!
//! - **Context**: a container holding the HTTP sender and environment access,
//!   always constructed explicitly by the caller.
//! - **Traits**: [`HttpSend`] and [`Env`] for the outer world,
//!   [`ProvideCredential`] and [`SigningCredential`] for credential loading.
//! - **Error**: a single [`Error`] type whose [`ErrorKind`] tells
//!   configuration, transport, signing and parse failures apart.
//!
//! ## Utilities
//!
//! - [`hash`]: SHA256 and HMAC-SHA256 primitives
//! - [`time`]: Time formatting for signing
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SigningCredential};
mod request;
pub use request::SigningRequest;

mod error;
pub use error::{Error, ErrorKind, Result};
