//! reCAPTCHA token verification

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::RecaptchaConfig;

/// Response of the siteverify endpoint. Only `success` drives the pipeline,
/// the rest is logged when a token is rejected.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Verification {
    pub success: bool,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub action: Option<String>,
}

impl Verification {
    pub fn passed() -> Self {
        Self {
            success: true,
            error_codes: Vec::new(),
            hostname: None,
            score: None,
            action: None,
        }
    }

    pub fn rejected(error_codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            success: false,
            error_codes: error_codes.into_iter().map(Into::into).collect(),
            ..Self::passed()
        }
    }
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("verification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("verification service answered with status {0}")]
    Status(u16),
}

/// Checks a client token against the verification service.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Verification, VerifyError>;
}

#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    verify_url: String,
    secret_key: String,
}

impl RecaptchaVerifier {
    pub fn new(config: &RecaptchaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            verify_url: config.verify_url.clone(),
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl TokenVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<Verification, VerifyError> {
        let response = self
            .client
            .get(&self.verify_url)
            .query(&[("secret", self.secret_key.as_str()), ("response", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VerifyError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Verification>().await?)
    }
}
