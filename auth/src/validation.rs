//! Client-side form validation and payload normalization.
//!
//! Validation runs before any network call; a failing form never reaches the
//! gateway. Normalization produces the canonical payloads the backend expects.

use crate::error::AuthError;
use crate::role::Role;
use serde::Serialize;
use std::fmt;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Email address.
    Email,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
    /// Requested role.
    Role,
    /// One-time login code.
    Code,
}

impl Field {
    /// Form field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Role => "role",
            Self::Code => "code",
        }
    }
}

/// Per-field validation messages, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(Field, &'static str)>,
}

impl ValidationErrors {
    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push((field, message));
    }

    /// Returns `true` if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    /// All failures.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().copied()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors.to_string())
    }
}

/// Loose email shape check: something, `@`, something, `.`, something, with
/// no whitespace inside the match.
///
/// # Examples
///
/// ```
/// use ipgate_auth::validation::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("first.last+tag@sub.example.co"));
/// assert!(!is_valid_email("user@example"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user @example.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.char_indices().any(|(at, c)| {
        if c != '@' {
            return false;
        }

        // Non-whitespace immediately before the '@'
        let has_local = email[..at]
            .chars()
            .next_back()
            .is_some_and(|prev| !prev.is_whitespace());
        if !has_local {
            return false;
        }

        // Domain: the whitespace-free run after '@' needs an inner '.'
        let domain = email[at + 1..]
            .split(char::is_whitespace)
            .next()
            .unwrap_or_default();
        domain
            .char_indices()
            .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

/// Canonical email form: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str, invalid: &'static str, errors: &mut ValidationErrors) {
    if email.trim().is_empty() {
        errors.push(Field::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.push(Field::Email, invalid);
    }
}

fn check_password(password: &str, errors: &mut ValidationErrors) {
    if password.is_empty() {
        errors.push(Field::Password, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(Field::Password, "Password must be at least 4 characters");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════════════════

/// Email/password login form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
}

impl LoginForm {
    /// Build a form.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&self.email, "Enter a valid email address", &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════

/// Account registration form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email as typed.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Requested role, any case.
    pub role: String,
}

impl RegistrationForm {
    /// Validate the form and build the canonical request.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.first_name.trim().is_empty() {
            errors.push(Field::FirstName, "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.push(Field::LastName, "Last name is required");
        }

        check_email(&self.email, "Enter a valid email", &mut errors);
        check_password(&self.password, &mut errors);

        if self.confirm_password.is_empty() {
            errors.push(Field::ConfirmPassword, "Confirm password is required");
        } else if self.password != self.confirm_password {
            errors.push(Field::ConfirmPassword, "Passwords do not match");
        }

        let role = Role::parse(&self.role);
        if role.is_none() {
            errors.push(Field::Role, "Select a role");
        }

        match role {
            Some(role) if errors.is_empty() => Ok(RegisterRequest {
                username: format!("{} {}", self.first_name.trim(), self.last_name.trim())
                    .trim()
                    .to_string(),
                email: normalize_email(&self.email),
                password: self.password.clone(),
                role,
            }),
            _ => Err(errors),
        }
    }
}

/// Canonical registration payload.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// `"first last"`, trimmed.
    pub username: String,
    /// Normalized email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Requested role, serialized uppercase.
    pub role: Role,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// One-time code
// ═══════════════════════════════════════════════════════════════════════

/// Validate an email for a one-time-code request.
///
/// # Errors
///
/// Returns the email failure.
pub fn validate_code_request(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(email, "Enter a valid email address", &mut errors);
    errors.into_result()
}

/// Validate a one-time-code submission.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_code_login(email: &str, code: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(email, "Enter a valid email address", &mut errors);
    if code.trim().is_empty() {
        errors.push(Field::Code, "Login code is required");
    }
    errors.into_result()
}
