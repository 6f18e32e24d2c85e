use std::collections::HashMap;

use crate::{Outcome, address::is_valid_email};

pub const SEND_FIELD: &str = "send";
pub const FROM_FIELD: &str = "from";
pub const FIRSTNAME_FIELD: &str = "firstname";
pub const LASTNAME_FIELD: &str = "lastname";
pub const SUBJECT_FIELD: &str = "subject";
pub const MESSAGE_FIELD: &str = "message";
pub const TOKEN_FIELD: &str = "g-recaptcha-response";

/// Raw contact form fields as they arrived. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedForm {
    pub from: String,
    pub firstname: String,
    pub lastname: String,
    pub subject: String,
    pub message: String,
    pub token: String,
}

/// A form that passed every local check and is ready for token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub from: String,
    pub firstname: String,
    pub lastname: String,
    pub subject: String,
    pub message: String,
    pub token: String,
}

impl SubmittedForm {
    pub fn from_fields(mut fields: HashMap<String, String>) -> Self {
        let mut take = |name: &str| fields.remove(name).unwrap_or_default();

        Self {
            from: take(FROM_FIELD),
            firstname: take(FIRSTNAME_FIELD),
            lastname: take(LASTNAME_FIELD),
            subject: take(SUBJECT_FIELD),
            message: take(MESSAGE_FIELD),
            token: take(TOKEN_FIELD),
        }
    }

    /// Runs the local part of the pipeline: field presence, sender address
    /// syntax, then token presence. The first failing check decides the
    /// outcome.
    pub fn validate(self) -> Result<ValidatedForm, Outcome> {
        let required = [
            &self.from,
            &self.firstname,
            &self.lastname,
            &self.subject,
            &self.message,
        ];

        if required.iter().any(|value| value.is_empty()) {
            return Err(Outcome::Empty);
        }

        if !is_valid_email(&self.from) {
            return Err(Outcome::InvalidEmail);
        }

        if self.token.is_empty() {
            return Err(Outcome::RecaptchaNotCompleted);
        }

        Ok(ValidatedForm {
            from: self.from,
            firstname: self.firstname,
            lastname: self.lastname,
            subject: self.subject,
            message: self.message,
            token: self.token,
        })
    }
}
