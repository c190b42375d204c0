use crate::Credential;
use async_trait::async_trait;
use bedsign_core::{Context, ProvideCredential, Result};
use log::{debug, warn};
use std::fmt::{self, Debug};

/// A chain of credential providers that will be tried in order.
///
/// The first provider returning a credential wins. If no provider returns
/// one, the last error seen is reported, otherwise `None`.
pub struct ProvideCredentialChain {
    providers: Vec<(&'static str, Box<dyn ProvideCredential<Credential = Credential>>)>,
}

impl ProvideCredentialChain {
    /// Create a new empty credential provider chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a credential provider to the chain.
    pub fn push<P>(mut self, provider: P) -> Self
    where
        P: ProvideCredential<Credential = Credential>,
    {
        self.providers.push((provider_name::<P>(), Box::new(provider)));
        self
    }
}

impl Default for ProvideCredentialChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ProvideCredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.providers.iter().map(|(name, _)| *name);
        f.debug_struct("ProvideCredentialChain")
            .field("providers", &names.collect::<Vec<_>>())
            .finish()
    }
}

/// Short type name of a provider, never its fields.
fn provider_name<P>() -> &'static str {
    let name = std::any::type_name::<P>();
    name.rsplit("::").next().unwrap_or(name)
}

#[async_trait]
impl ProvideCredential for ProvideCredentialChain {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let mut last_err = None;

        for (name, provider) in &self.providers {
            match provider.provide_credential(ctx).await {
                Ok(Some(cred)) => {
                    debug!("loaded credential from provider: {name}");
                    return Ok(Some(cred));
                }
                Ok(None) => {
                    debug!("no credential found in provider: {name}");
                }
                Err(e) => {
                    warn!("failed to load credential from provider {name}: {e}");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}
