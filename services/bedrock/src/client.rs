use std::fmt::{self, Debug};
use std::sync::Arc;

use bedsign_aws_v4::{Credential, RequestSigner};
use bedsign_core::time::DateTime;
use bedsign_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST};
use http::{Request, Uri};
use log::debug;

use crate::constants::{APPLICATION_JSON, SIGNING_SERVICE};
use crate::{Config, InvokeRequest, InvokeResponse};

/// BedrockClient sends signed `InvokeModel` calls to bedrock runtime.
///
/// The client owns no global state: the [`Context`] and the credential
/// provider are passed in by the caller. Credentials are loaded for every
/// call and every call is signed with a fresh timestamp.
///
/// ```no_run
/// use bedsign_aws_v4::EnvCredentialProvider;
/// use bedsign_bedrock::{BedrockClient, Config};
/// use bedsign_core::{Context, OsEnv};
/// use bedsign_http_send_reqwest::ReqwestHttpSend;
///
/// # async fn example() -> bedsign_core::Result<()> {
/// let ctx = Context::new()
///     .with_http_send(ReqwestHttpSend::default())
///     .with_env(OsEnv);
/// let config = Config::default().from_env(&ctx);
/// let client = BedrockClient::new(ctx, config, EnvCredentialProvider::new())?;
///
/// let answer = client.generate("hello").await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BedrockClient {
    ctx: Context,
    config: Config,
    provider: Arc<dyn ProvideCredential<Credential = Credential>>,
    signer: RequestSigner,
}

impl Debug for BedrockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockClient")
            .field("config", &self.config)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl BedrockClient {
    /// Create a new client, the config is validated up front.
    pub fn new(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        config.validate()?;

        let signer = RequestSigner::new(SIGNING_SERVICE, config.region());
        Ok(Self {
            ctx,
            config,
            provider: Arc::new(provider),
            signer,
        })
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.signer = self.signer.with_time(time);
        self
    }

    /// Config used by this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send `prompt` and return the text of the first result.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.invoke(prompt).await?.into_output_text().ok_or_else(|| {
            Error::response_invalid("response does not contain results[0].outputText")
        })
    }

    /// Send `prompt` and return the full parsed response.
    ///
    /// A non-2xx status is reported as a transport error carrying the
    /// status and the raw body, it is never parsed as the success shape.
    pub async fn invoke(&self, prompt: &str) -> Result<InvokeResponse> {
        let cred = self.load_credential().await?;
        let req = self.build_request(prompt, &cred)?;
        debug!("sending invoke request: {} {}", req.method(), req.uri());

        let resp = self.ctx.http_send_as_string(req).await?;
        let status = resp.status();
        debug!("invoke request responded with status: {status}");

        let body = resp.into_body();
        if !status.is_success() {
            return Err(Error::unexpected_status(status, body));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::response_invalid(format!("failed to parse invoke response: {e}")).with_source(e)
        })
    }

    /// Build the signed `InvokeModel` request for `prompt`.
    ///
    /// The returned request carries `host`, `content-type`, `x-amz-date`
    /// and `authorization` headers and the exact body that has been signed.
    pub fn build_request(&self, prompt: &str, cred: &Credential) -> Result<Request<Bytes>> {
        let body = serde_json::to_vec(&InvokeRequest {
            input_text: prompt,
            text_generation_config: &self.config.text_generation,
        })
        .map_err(|e| {
            Error::request_invalid("failed to serialize invoke request").with_source(e)
        })?;
        let body = Bytes::from(body);

        let uri: Uri = self.config.invoke_url().parse()?;
        let host = uri
            .authority()
            .ok_or_else(|| Error::config_invalid("endpoint must contain a host"))?
            .to_string();

        let (mut parts, body) = Request::post(uri)
            .header(HOST, host)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(body)?
            .into_parts();

        self.signer.sign(&mut parts, &body, cred)?;

        Ok(Request::from_parts(parts, body))
    }

    async fn load_credential(&self) -> Result<Credential> {
        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| Error::credential_invalid("no credential found for bedrock"))?;

        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "credential is missing access key or secret key, or has expired",
            ));
        }

        Ok(cred)
    }
}
