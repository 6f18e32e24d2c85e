use std::collections::HashMap;

use axum::{
    extract::{Form, FromRequest, Multipart, Request, State},
    http::{Method, header},
};
use formrelay_contact::{ContactEmailTemplate, Outcome, SEND_FIELD, SubmittedForm, Template};

use crate::{error::AppError, mailer::OutgoingEmail, routes::AppState};

/// A contact submission that passed the method/shape gate.
#[derive(Debug)]
pub struct ContactSubmission {
    pub form: SubmittedForm,
    /// `Host` the form was posted to, quoted in the email footer
    pub host: String,
}

impl<S: Send + Sync> FromRequest<S> for ContactSubmission {
    type Rejection = Outcome;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.method() != Method::POST {
            return Err(Outcome::InvalidRequest);
        }

        let host = req
            .headers()
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let fields = if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|_| Outcome::InvalidRequest)?;
            fields
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| Outcome::InvalidRequest)?;
            multipart_fields(multipart).await?
        } else {
            return Err(Outcome::InvalidRequest);
        };

        if !fields.contains_key(SEND_FIELD) {
            return Err(Outcome::InvalidRequest);
        }

        Ok(Self {
            form: SubmittedForm::from_fields(fields),
            host,
        })
    }
}

/// Collects every multipart field as text. Invalid UTF-8 is replaced rather
/// than rejected.
async fn multipart_fields(mut multipart: Multipart) -> Result<HashMap<String, String>, Outcome> {
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| Outcome::InvalidRequest)?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        let bytes = field.bytes().await.map_err(|_| Outcome::InvalidRequest)?;
        fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
    }

    Ok(fields)
}

/// POST contact endpoint
///
/// Validates the submission, verifies the reCAPTCHA token and relays the
/// message. Any other method ends in `invalid_request` at the extractor.
#[tracing::instrument(skip_all, fields(host = %submission.host))]
pub async fn send(
    State(app_state): State<AppState>,
    submission: ContactSubmission,
) -> Result<Outcome, AppError> {
    let form = match submission.form.validate() {
        Ok(form) => form,
        Err(outcome) => {
            tracing::debug!(%outcome, "Submission rejected");
            return Ok(outcome);
        }
    };

    let verification = app_state.verifier.verify(&form.token).await?;

    if !verification.success {
        tracing::debug!(
            error_codes = ?verification.error_codes,
            hostname = ?verification.hostname,
            score = ?verification.score,
            action = ?verification.action,
            "reCAPTCHA rejected the token"
        );
        return Ok(Outcome::InvalidRecaptcha);
    }

    let html = ContactEmailTemplate::new(&form, &submission.host).render()?;

    app_state
        .mailer
        .send(OutgoingEmail {
            reply_to: form.from,
            subject: form.subject,
            html,
        })
        .await?;

    tracing::info!("Contact message relayed");

    Ok(Outcome::Success)
}
