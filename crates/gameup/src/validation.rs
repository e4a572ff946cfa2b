//! Client-side checks on the registration form.
//!
//! These run before anything is sent; a form that fails them never reaches
//! the network.

use std::fmt;
use std::sync::LazyLock;

use gameup_protocol::RegisterRequest;
use regex::Regex;

// The pattern is a literal, so compiling it cannot fail at runtime.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

/// What the user typed into the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = ValidationErrors {
            username: check_username(&self.username),
            email: check_email(&self.email),
            password: check_password(&self.password),
        };
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The wire body for `POST /register`.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// Per-field messages, ready to show next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [&self.username, &self.email, &self.password]
            .into_iter()
            .flatten()
            .map(|m| m.trim_end())
            .collect();
        f.write_str(&messages.join(" "))
    }
}

fn check_username(username: &str) -> Option<String> {
    username
        .trim()
        .is_empty()
        .then(|| "Username is required".to_string())
}

fn check_email(email: &str) -> Option<String> {
    if email.is_empty() {
        Some("Email is required".to_string())
    } else if !EMAIL.is_match(email) {
        Some("Email address is invalid".to_string())
    } else {
        None
    }
}

/// Problems accumulate into one message, in a fixed order.
fn check_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }

    let mut message = String::new();
    if password.chars().count() < 8 {
        message.push_str("Password must be at least 8 characters. ");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        message.push_str("Must contain an uppercase letter. ");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        message.push_str("Must contain a lowercase letter. ");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        message.push_str("Must contain a number.");
    }
    (!message.is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str) -> RegistrationForm {
        RegistrationForm::new("ana", "ana@example.com", password)
    }

    #[test]
    fn test_validate_good_form_passes() {
        assert_eq!(form("Abcdefg1").validate(), Ok(()));
    }

    #[test]
    fn test_validate_short_password_lists_every_problem() {
        let errors = form("abc").validate().unwrap_err();
        let expected = concat!(
            "Password must be at least 8 characters. ",
            "Must contain an uppercase letter. ",
            "Must contain a number.",
        );
        assert_eq!(errors.password.as_deref(), Some(expected));
        assert!(errors.email.is_none());
        assert!(errors.username.is_none());
    }

    #[test]
    fn test_validate_missing_digit_only() {
        let errors = form("Abcdefgh").validate().unwrap_err();
        assert_eq!(errors.password.as_deref(), Some("Must contain a number."));
    }

    #[test]
    fn test_validate_missing_lowercase_only() {
        let errors = form("ABCDEFG1").validate().unwrap_err();
        assert_eq!(
            errors.password.as_deref(),
            Some("Must contain a lowercase letter. ")
        );
    }

    #[test]
    fn test_validate_empty_fields_required() {
        let errors = RegistrationForm::default().validate().unwrap_err();
        assert_eq!(errors.username.as_deref(), Some("Username is required"));
        assert_eq!(errors.email.as_deref(), Some("Email is required"));
        assert_eq!(errors.password.as_deref(), Some("Password is required"));
    }

    #[test]
    fn test_validate_email_shape() {
        for bad in ["ana", "ana@example", "ana example.com", "@."] {
            let errors = RegistrationForm::new("ana", bad, "Abcdefg1")
                .validate()
                .unwrap_err();
            assert_eq!(
                errors.email.as_deref(),
                Some("Email address is invalid"),
                "{bad:?} should be rejected"
            );
        }
        assert!(RegistrationForm::new("ana", "a@b.co", "Abcdefg1").validate().is_ok());
    }

    #[test]
    fn test_display_joins_messages() {
        let errors = ValidationErrors {
            username: Some("Username is required".into()),
            email: None,
            password: Some("Must contain a number.".into()),
        };
        assert_eq!(errors.to_string(), "Username is required Must contain a number.");
    }

    #[test]
    fn test_to_request_trims_identity_fields_only() {
        let request = RegistrationForm::new(" ana ", " ana@example.com", " Abcdefg1 ").to_request();
        assert_eq!(request.username, "ana");
        assert_eq!(request.email, "ana@example.com");
        assert_eq!(request.password, " Abcdefg1 ");
    }
}
