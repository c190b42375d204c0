use std::fmt;

use bedsign_core::time::{format_date, DateTime};

use crate::constants::AWS4_REQUEST;

/// CredentialScope narrows a signature to one day, one region and one service.
///
/// Displayed as `20240101/us-east-1/bedrock/aws4_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    date: String,
    region: String,
    service: String,
}

impl CredentialScope {
    /// Build the scope for the given signing time.
    ///
    /// The date must come from the same timestamp used in the string to
    /// sign, so callers capture the time once and pass it everywhere.
    pub fn new(time: DateTime, region: &str, service: &str) -> Self {
        Self {
            date: format_date(time),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Date stamp of this scope: `YYYYMMDD`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Region of this scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service of this scope.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.date, self.region, self.service, AWS4_REQUEST
        )
    }
}
