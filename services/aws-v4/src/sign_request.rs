use bedsign_core::hash::hex_sha256;
use bedsign_core::time::{format_iso8601, now, DateTime};
use bedsign_core::{Error, Result, SigningCredential, SigningRequest};
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;

use crate::canonical::{canonicalize_query, CanonicalRequest};
use crate::constants::{AWS4_HMAC_SHA256, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};
use crate::{Credential, CredentialScope, SigningKey};

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Signing is pure: the same request, body, credential and time always
/// produce the same `Authorization` header.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Service name used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign the request in place.
    ///
    /// `host` and `x-amz-date` (plus `x-amz-security-token` for temporary
    /// credentials) are inserted, every header present is signed, and the
    /// `Authorization` header is added last. `body` must be the exact bytes
    /// that will be sent.
    pub fn sign(&self, req: &mut Parts, body: &[u8], cred: &Credential) -> Result<()> {
        if self.region.is_empty() || self.service.is_empty() {
            return Err(Error::config_invalid(
                "region and service are required for signing",
            ));
        }
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "credential is missing access key or secret key, or has expired",
            ));
        }

        // Capture time once, both the header and the scope derive from it.
        let now = self.time.unwrap_or_else(now);
        let amz_date = format_iso8601(now);
        let scope = CredentialScope::new(now, &self.region, &self.service);
        debug!("calculated scope: {scope}");

        let mut signed_req = SigningRequest::build(req)?;

        canonicalize_header(&mut signed_req, cred, &amz_date)?;
        canonicalize_query(&mut signed_req);

        // The canonical request carries header values such as the session
        // token, so only the string to sign is logged.
        let creq = CanonicalRequest::build(&signed_req, hex_sha256(body))?;

        let string_to_sign = string_to_sign(&amz_date, &scope, &creq);
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = SigningKey::derive(&cred.secret_access_key, &scope)?;
        let signature = signing_key.sign(&string_to_sign)?;

        let mut authorization = HeaderValue::from_str(&authorization_header(
            &cred.access_key_id,
            &scope,
            creq.signed_headers(),
            &signature,
        ))?;
        authorization.set_sensitive(true);

        signed_req
            .headers
            .insert(header::AUTHORIZATION, authorization);

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20240101T000000Z
/// 20240101/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(amz_date: &str, scope: &CredentialScope, creq: &CanonicalRequest) -> String {
    format!("{AWS4_HMAC_SHA256}\n{amz_date}\n{scope}\n{}", creq.hash())
}

/// Assemble the value of the `Authorization` header.
pub fn authorization_header(
    access_key_id: &str,
    scope: &CredentialScope,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{AWS4_HMAC_SHA256} Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}

fn canonicalize_header(
    req: &mut SigningRequest,
    cred: &Credential,
    amz_date: &str,
) -> Result<()> {
    // A stale signature must never be signed over.
    req.headers.remove(header::AUTHORIZATION);

    // Header values need to be normalized according to Step 4 of https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html
    for (_, value) in req.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)?;
    }

    // Insert HOST header if not present.
    if req.headers.get(header::HOST).is_none() {
        req.headers.insert(
            header::HOST,
            HeaderValue::from_str(req.authority.as_str())?,
        );
    }

    // Always overwrite the date so header and string to sign agree.
    req.headers
        .insert(X_AMZ_DATE, HeaderValue::from_str(amz_date)?);

    // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
    if let Some(token) = &cred.session_token {
        let mut value = HeaderValue::from_str(token)?;
        // Set token value sensitive to avoid leaking.
        value.set_sensitive(true);

        req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }

    Ok(())
}
