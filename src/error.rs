use axum::response::{IntoResponse, Response};
use formrelay_contact::Outcome;
use thiserror::Error;

use crate::{mailer::MailError, recaptcha::VerifyError};

/// Infrastructure failures while handling a submission.
///
/// Rejected input never ends up here; it resolves to an [`Outcome`] directly.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("reCAPTCHA verification error: {0}")]
    Verification(#[from] VerifyError),

    #[error("Email template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

impl AppError {
    /// Outcome reported to the caller. Transport details stay in the logs.
    pub fn outcome(&self) -> Outcome {
        match self {
            AppError::Verification(_) => Outcome::InvalidRecaptcha,
            AppError::Template(_) | AppError::Mail(_) => Outcome::Error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let outcome = self.outcome();

        match &self {
            AppError::Verification(e) => {
                tracing::error!(error = %e, outcome = %outcome, "reCAPTCHA verification failed");
            }
            AppError::Template(e) => {
                tracing::error!(error = %e, outcome = %outcome, "Failed to render email");
            }
            AppError::Mail(e) => {
                tracing::error!(error = %e, outcome = %outcome, "Failed to send email");
            }
        }

        outcome.into_response()
    }
}
