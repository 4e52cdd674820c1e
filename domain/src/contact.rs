use crate::DomainError;
use serde::Deserialize;

const MIN_NAME_CHARS: usize = 2;
const MIN_SUBJECT_CHARS: usize = 5;
const MIN_MESSAGE_CHARS: usize = 10;

/// A message sent to a business through the contact form.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactMessage {
    /// Reports every violated rule at once, one message per field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut problems = Vec::new();
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            problems.push(format!(
                "name must be at least {} characters",
                MIN_NAME_CHARS
            ));
        }
        if !is_valid_email(self.email.trim()) {
            problems.push("email must be a valid email address".to_string());
        }
        if self.subject.trim().chars().count() < MIN_SUBJECT_CHARS {
            problems.push(format!(
                "subject must be at least {} characters",
                MIN_SUBJECT_CHARS
            ));
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            problems.push(format!(
                "message must be at least {} characters",
                MIN_MESSAGE_CHARS
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidContact(problems))
        }
    }
}

/// `local@domain.tld`: one '@', no whitespace, a dot inside the domain with text on both sides.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
