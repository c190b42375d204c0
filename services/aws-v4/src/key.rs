use std::fmt;

use bedsign_core::hash::{hex_hmac_sha256, hmac_sha256, SHA256_LEN};
use bedsign_core::Result;

use crate::constants::{AWS4_REQUEST, AWS4_SECRET_PREFIX};
use crate::CredentialScope;

/// SigningKey is the scope-bound key derived from a secret access key.
///
/// It lives only for one signing operation and is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; SHA256_LEN]);

impl SigningKey {
    /// Derive the signing key for `scope` from `secret`.
    ///
    /// ```text
    /// kSecret  = "AWS4" + secret
    /// kDate    = HMAC(kSecret, date)
    /// kRegion  = HMAC(kDate, region)
    /// kService = HMAC(kRegion, service)
    /// kSigning = HMAC(kService, "aws4_request")
    /// ```
    ///
    /// Every step keys the next one with the raw 32 bytes of its output.
    pub fn derive(secret: &str, scope: &CredentialScope) -> Result<Self> {
        let secret = format!("{AWS4_SECRET_PREFIX}{secret}");
        let sign_date = hmac_sha256(secret.as_bytes(), scope.date().as_bytes())?;
        let sign_region = hmac_sha256(&sign_date, scope.region().as_bytes())?;
        let sign_service = hmac_sha256(&sign_region, scope.service().as_bytes())?;
        let sign_request = hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes())?;

        Ok(Self(sign_request))
    }

    /// Hex encoded HMAC-SHA256 of `string_to_sign` under this key.
    pub fn sign(&self, string_to_sign: &str) -> Result<String> {
        hex_hmac_sha256(&self.0, string_to_sign.as_bytes())
    }

    /// Raw bytes of the key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedsign_core::time::parse_iso8601;

    #[test]
    fn test_derive_signing_key() -> anyhow::Result<()> {
        // Example from the AWS general reference.
        let scope = CredentialScope::new(parse_iso8601("20120215T000000Z")?, "us-east-1", "iam");
        let key = SigningKey::derive("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", &scope)?;

        assert_eq!(key.as_bytes().len(), SHA256_LEN);
        assert_eq!(
            hex::encode(key.as_bytes()),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
        Ok(())
    }

    #[test]
    fn test_signing_key_depends_on_scope() -> anyhow::Result<()> {
        let time = parse_iso8601("20240101T000000Z")?;
        let key = SigningKey::derive("secret", &CredentialScope::new(time, "us-east-1", "bedrock"))?;
        assert_eq!(
            hex::encode(key.as_bytes()),
            "6fcaca03bc1f01b444f8763a07b70bf784daa0256955d19f3e297d89b042bd96"
        );

        let other =
            SigningKey::derive("secret", &CredentialScope::new(time, "us-west-2", "bedrock"))?;
        assert_ne!(key, other);
        Ok(())
    }

    #[test]
    fn test_signature_is_64_hex_chars() -> anyhow::Result<()> {
        let time = parse_iso8601("20240101T000000Z")?;
        let key = SigningKey::derive("secret", &CredentialScope::new(time, "us-east-1", "bedrock"))?;

        let signature = key.sign("AWS4-HMAC-SHA256\n20240101T000000Z")?;
        assert_eq!(signature.len(), 64);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        Ok(())
    }

    #[test]
    fn test_signing_key_debug_is_redacted() -> anyhow::Result<()> {
        let time = parse_iso8601("20240101T000000Z")?;
        let key = SigningKey::derive("secret", &CredentialScope::new(time, "us-east-1", "bedrock"))?;
        assert_eq!(format!("{key:?}"), "SigningKey(***)");
        Ok(())
    }
}
