use bedsign_aws_v4::encode_path_segment;
use bedsign_core::{Context, Error, Result};

use crate::constants::*;
use crate::TextGenerationConfig;

/// Config carries all the configuration for bedrock runtime calls.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    /// - default to `us-east-1`
    pub region: Option<String>,
    /// `model_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BEDROCK_MODEL_ID`]
    /// - default to `amazon.titan-text-express-v1`
    pub model_id: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`BEDROCK_ENDPOINT`]
    ///
    /// Replaces `https://bedrock-runtime.<region>.amazonaws.com`, mostly
    /// useful for tests and VPC endpoints.
    pub endpoint: Option<String>,
    /// Generation parameters sent with every prompt.
    pub text_generation: TextGenerationConfig,
}

impl Config {
    /// Load config from env.
    ///
    /// Values set explicitly win over env, empty env values are ignored.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let env = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        if let Some(v) = env(AWS_REGION).or_else(|| env(AWS_DEFAULT_REGION)) {
            self.region.get_or_insert(v);
        }
        if let Some(v) = env(BEDROCK_MODEL_ID) {
            self.model_id.get_or_insert(v);
        }
        if let Some(v) = env(BEDROCK_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }

        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the model id.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Set the endpoint override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the generation parameters.
    pub fn with_text_generation(mut self, text_generation: TextGenerationConfig) -> Self {
        self.text_generation = text_generation;
        self
    }

    /// Region to call, `us-east-1` if unset.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Model to invoke, `amazon.titan-text-express-v1` if unset.
    pub fn model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }

    /// Check that the config can address a model.
    ///
    /// The region ends up in the host name and the credential scope, so it
    /// may only hold lowercase letters, digits and `-`.
    pub fn validate(&self) -> Result<()> {
        let region = self.region();
        if region.is_empty() {
            return Err(Error::config_invalid("region is required"));
        }
        if !region
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(Error::config_invalid(format!(
                "region must only contain lowercase letters, digits and '-', got {region:?}"
            )));
        }
        if self.model_id().trim().is_empty() {
            return Err(Error::config_invalid("model id is required"));
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::config_invalid(format!(
                    "endpoint must start with http:// or https://, got {endpoint}"
                )));
            }
        }

        Ok(())
    }

    /// Base endpoint without trailing `/`.
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(v) => v.trim_end_matches('/').to_string(),
            None => format!(
                "https://{SIGNING_SERVICE}-runtime.{}.amazonaws.com",
                self.region()
            ),
        }
    }

    /// Full invoke URL for the configured model.
    ///
    /// The model id is percent-encoded as a single path segment.
    pub fn invoke_url(&self) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint(),
            encode_path_segment(self.model_id())
        )
    }
}
