use askama::Template;

use crate::ValidatedForm;

/// HTML notification relayed to the site owner.
///
/// Every interpolated value goes through askama's HTML escaper, so markup
/// typed into the form shows up as text in the mail client.
#[derive(Template)]
#[template(path = "emails/contact.html")]
pub struct ContactEmailTemplate<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub message_lines: Vec<&'a str>,
    pub host: &'a str,
}

impl<'a> ContactEmailTemplate<'a> {
    pub fn new(form: &'a ValidatedForm, host: &'a str) -> Self {
        Self {
            firstname: &form.firstname,
            lastname: &form.lastname,
            email: &form.from,
            message_lines: message_lines(&form.message),
            host,
        }
    }
}

/// Splits on `\n`, `\r\n` and lone `\r` so each line break becomes `<br>`.
fn message_lines(message: &str) -> Vec<&str> {
    message
        .split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
        .collect()
}
