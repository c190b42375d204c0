use std::fmt;

use bedsign_core::hash::hex_sha256;
use bedsign_core::{Result, SigningRequest};
use http::Method;
use percent_encoding::utf8_percent_encode;

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};

/// CanonicalRequest is the normalized form of a request that both sides
/// derive before signing.
///
/// ```text
/// <METHOD>
/// <CanonicalURI>
/// <CanonicalQueryString>
/// <CanonicalHeaders>
///
/// <SignedHeaders>
/// <PayloadHash>
/// ```
///
/// Header names are lowercase and sorted ascending, `SignedHeaders` lists
/// exactly the same names in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: Method,
    uri: String,
    query: String,
    headers: Vec<(String, String)>,
    signed_headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request from a signing request.
    ///
    /// Header values must be normalized and query pairs must be encoded
    /// already, see [`canonicalize_query`].
    pub fn build(req: &SigningRequest, payload_hash: impl Into<String>) -> Result<Self> {
        let names = req.header_name_to_vec_sorted();

        let mut headers = Vec::with_capacity(names.len());
        for name in &names {
            let value = req.header_value_joined(name)?;
            headers.push((name.to_string(), value));
        }

        Ok(Self {
            method: req.method.clone(),
            uri: canonical_uri(&req.path),
            query: SigningRequest::query_to_string(req.query.clone(), "=", "&"),
            signed_headers: names.join(";"),
            headers,
            payload_hash: payload_hash.into(),
        })
    }

    /// The `;` joined, sorted list of signed header names.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// The canonical headers block, one `name:value\n` line per header.
    pub fn canonical_headers(&self) -> String {
        let mut s = String::with_capacity(self.headers.len() * 32);
        for (k, v) in &self.headers {
            s.push_str(k);
            s.push(':');
            s.push_str(v);
            s.push('\n');
        }
        s
    }

    /// The canonical URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The canonical query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hex encoded SHA256 of the payload.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Hex encoded SHA256 of the canonical request itself.
    pub fn hash(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (k, v) in &self.headers {
            writeln!(f, "{k}:{v}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        f.write_str(&self.payload_hash)
    }
}

/// Encode the path as sent on the wire.
///
/// Services other than S3 expect the path to be encoded once more on top of
/// the encoding already applied in the URL, so `%3A` becomes `%253A`.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    utf8_percent_encode(path, &AWS_URI_ENCODE_SET).to_string()
}

/// Sort query pairs by name and percent-encode them the way SigV4 expects.
///
/// The encoded pairs are written back so the request carries exactly what
/// has been signed.
pub fn canonicalize_query(req: &mut SigningRequest) {
    if req.query.is_empty() {
        return;
    }

    let mut query = req
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    query.sort();

    req.query = query;
}

/// Percent-encode a single path segment, `/` included.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, &AWS_QUERY_ENCODE_SET).to_string()
}
