// src/models/student.rs

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::error::AppError;

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").expect("static pattern"));

static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("static pattern"));

/// Represents the 'students' collection, keyed by identity.
/// Display-only data for the quiz header.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub username: String,
    pub roll_no: String,
    pub email: String,
}

/// Credentials record kept by the bundled authenticator.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub identity: String,
    pub email: String,
    /// Argon2 password hash.
    pub password_hash: String,
}

/// DTO for signing up.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(length(min = 3, message = "Name should be at least 3 characters"))]
    pub username: String,
    #[validate(length(max = 7, message = "Roll No. should be atmost 7 characters"))]
    pub roll_no: String,
    #[validate(email(message = "Email is required"))]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must contain at least 8 characters"),
        custom(function = validate_password_strength)
    )]
    pub password: String,
    pub cpassword: String,
}

impl SignupForm {
    /// Field rules plus the password confirmation.
    pub fn check(&self) -> Result<(), AppError> {
        if let Err(validation_errors) = self.validate() {
            return Err(AppError::BadRequest(validation_errors.to_string()));
        }
        if self.password != self.cpassword {
            return Err(AppError::BadRequest("cpassword: Passwords do not match".to_string()));
        }
        Ok(())
    }

    pub fn profile(&self) -> StudentProfile {
        StudentProfile {
            username: self.username.clone(),
            roll_no: self.roll_no.clone(),
            email: self.email.clone(),
        }
    }
}

/// DTO for logging in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must contain at least 8 characters"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|validation_errors| AppError::BadRequest(validation_errors.to_string()))
    }
}

/// Requires at least one digit and one special character.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if !DIGIT.is_match(password) {
        return Err(ValidationError::new("password_digit")
            .with_message(Cow::Borrowed("Password must contain at least one number")));
    }
    if !SPECIAL.is_match(password) {
        return Err(ValidationError::new("password_special").with_message(Cow::Borrowed(
            "Password must contain at least one special character",
        )));
    }
    Ok(())
}
