//! Bedrock runtime inference built on AWS SigV4 signing.
//!
//! [`BedrockClient::generate`] serializes a prompt into the text generation
//! payload, signs it with [`bedsign_aws_v4::RequestSigner`], sends it through
//! the [`bedsign_core::HttpSend`] of the caller's context and extracts
//! `results[0].outputText` from the response.
//!
//! Failures keep their kind: transport errors carry the status and raw
//! body, while a reachable service returning an unexpected body yields a
//! parse error.

#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod model;
pub use model::{InvokeRequest, InvokeResponse, InvokeResult, TextGenerationConfig};

mod client;
pub use client::BedrockClient;
