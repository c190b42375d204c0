//! AWS SigV4 request signing.
//!
//! This crate signs `http::request::Parts` with AWS Signature Version 4:
//!
//! - [`CanonicalRequest`]: the normalized request both sides derive.
//! - [`CredentialScope`]: `date/region/service/aws4_request`.
//! - [`SigningKey`]: the HMAC key chain derived from a secret key.
//! - [`RequestSigner`]: ties everything together and writes the
//!   `Authorization` header.
//!
//! Credentials are loaded through [`bedsign_core::ProvideCredential`]
//! implementations such as [`EnvCredentialProvider`] and
//! [`StaticCredentialProvider`], optionally combined with
//! [`ProvideCredentialChain`].
//!
//! ## Example
//!
//! ```no_run
//! use bedsign_aws_v4::{Credential, RequestSigner};
//!
//! # fn main() -> bedsign_core::Result<()> {
//! let signer = RequestSigner::new("bedrock", "us-east-1");
//! let cred = Credential::new("access_key_id", "secret_access_key");
//!
//! let body = br#"{"inputText":"hello"}"#;
//! let (mut parts, _) = http::Request::post(
//!     "https://bedrock-runtime.us-east-1.amazonaws.com/model/test-model/invoke",
//! )
//! .header("content-type", "application/json")
//! .body(())?
//! .into_parts();
//!
//! signer.sign(&mut parts, body, &cred)?;
//! assert!(parts.headers.contains_key("authorization"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod constants;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod canonical;
pub use canonical::{canonicalize_query, encode_path_segment, CanonicalRequest};

mod scope;
pub use scope::CredentialScope;

mod key;
pub use key::SigningKey;

mod sign_request;
pub use sign_request::{authorization_header, string_to_sign, RequestSigner};
