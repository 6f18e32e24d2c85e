use lettre::message::Mailbox;
use validator::ValidateEmail;

/// Checks a sender address the way a mail relay will accept it.
///
/// On top of the RFC 5322 syntax check the domain must be dot-qualified, so
/// `user@localhost` style addresses are rejected. The address must also parse
/// as the `Reply-To` mailbox of the relayed message.
pub fn is_valid_email(value: &str) -> bool {
    if !value.validate_email() {
        return false;
    }

    let Some((_, domain)) = value.rsplit_once('@') else {
        return false;
    };

    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return false;
    }

    value.parse::<Mailbox>().is_ok()
}
