use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, VariantArray};

/// Result of handling one contact submission.
///
/// Every path through the pipeline ends in exactly one of these. The table
/// of status, message and HTTP code is fixed at compile time.
#[derive(
    EnumString, Display, VariantArray, AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Success,
    Error,
    Empty,
    InvalidEmail,
    InvalidRecaptcha,
    RecaptchaNotCompleted,
    InvalidRequest,
}

/// JSON body sent back to the caller.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutcomeBody {
    pub status: i8,
    pub message: &'static str,
}

impl Outcome {
    /// Machine status: 1 on success, 0 on server failure, -1 on rejected input.
    pub fn status(self) -> i8 {
        match self {
            Outcome::Success => 1,
            Outcome::Error => 0,
            Outcome::Empty
            | Outcome::InvalidEmail
            | Outcome::InvalidRecaptcha
            | Outcome::RecaptchaNotCompleted
            | Outcome::InvalidRequest => -1,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Success => "Sent successfully. Thank you for contacting me! 😊",
            Outcome::Error => "Error sending the message.",
            Outcome::Empty => "There are empty fields.",
            Outcome::InvalidEmail => "The email is invalid.",
            Outcome::InvalidRecaptcha => "The reCAPTCHA is invalid.",
            Outcome::RecaptchaNotCompleted => "The reCAPTCHA has not been completed.",
            Outcome::InvalidRequest => "Invalid request.",
        }
    }

    pub fn http_code(self) -> u16 {
        match self {
            Outcome::Success => 200,
            Outcome::Error => 500,
            Outcome::InvalidRequest => 400,
            Outcome::Empty
            | Outcome::InvalidEmail
            | Outcome::InvalidRecaptcha
            | Outcome::RecaptchaNotCompleted => 422,
        }
    }

    pub fn body(self) -> OutcomeBody {
        OutcomeBody {
            status: self.status(),
            message: self.message(),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "axum")] {
        use axum::{
            Json,
            http::StatusCode,
            response::{IntoResponse, Response},
        };

        impl IntoResponse for Outcome {
            fn into_response(self) -> Response {
                let status = StatusCode::from_u16(self.http_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

                (status, Json(self.body())).into_response()
            }
        }
    }
}
