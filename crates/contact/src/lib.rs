mod address;
mod form;
mod outcome;
mod template;

pub use address::is_valid_email;
pub use form::*;
pub use outcome::{Outcome, OutcomeBody};
pub use template::ContactEmailTemplate;

pub use askama::Template;
