//! Live tests against bedrock runtime.
//!
//! Set `BEDSIGN_BEDROCK_TEST=on` together with the usual AWS env values
//! (or a `.env` file) to run them.

use std::env;

use anyhow::Result;
use bedsign_aws_v4::{EnvCredentialProvider, StaticCredentialProvider};
use bedsign_bedrock::{BedrockClient, Config};
use bedsign_core::{Context, ErrorKind, OsEnv};
use bedsign_http_send_reqwest::ReqwestHttpSend;
use http::StatusCode;
use log::warn;

fn init_live_test() -> Option<Context> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("BEDSIGN_BEDROCK_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    Some(
        Context::new()
            .with_http_send(ReqwestHttpSend::default())
            .with_env(OsEnv),
    )
}

#[tokio::test]
async fn test_generate() -> Result<()> {
    let Some(ctx) = init_live_test() else {
        warn!("BEDSIGN_BEDROCK_TEST is not set, skipped");
        return Ok(());
    };

    let config = Config::default().from_env(&ctx);
    let client = BedrockClient::new(ctx, config, EnvCredentialProvider::new())?;

    let output = client.generate("Say hello in one word.").await?;
    assert!(!output.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_generate_with_invalid_credential() -> Result<()> {
    let Some(ctx) = init_live_test() else {
        warn!("BEDSIGN_BEDROCK_TEST is not set, skipped");
        return Ok(());
    };

    let config = Config::default().from_env(&ctx);
    let provider = StaticCredentialProvider::new("AKIDEXAMPLEINVALID", "not-a-real-secret");
    let client = BedrockClient::new(ctx, config, provider)?;

    let err = client
        .generate("hello")
        .await
        .expect_err("invalid credential must be rejected");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(
        err.status(),
        Some(StatusCode::FORBIDDEN) | Some(StatusCode::UNAUTHORIZED)
    ));
    Ok(())
}
