//! Submitted forms and their field-level validation.
//!
//! Checks that need storage (group existence, username uniqueness) run in
//! the services; everything here is pure.

use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_GROUP_TITLE_LEN: usize = 200;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `None` for missing or blank optional inputs.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Create/edit post form. `group` carries a group id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PostForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if blank(&self.text) {
            errors.add("text", REQUIRED);
        }
        if let Some(image) = non_blank(self.image.as_deref()) {
            if image.starts_with('/') || image.split('/').any(|part| part == "..") {
                errors.add("image", "Enter a relative media path.");
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if blank(&self.text) {
            errors.add("text", REQUIRED);
        }
        errors
    }
}

/// Group creation form; a blank slug is derived from the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl GroupForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if blank(&self.title) {
            errors.add("title", REQUIRED);
        } else if self.title.trim().chars().count() > MAX_GROUP_TITLE_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {MAX_GROUP_TITLE_LEN} characters."),
            );
        }
        if let Some(slug) = non_blank(self.slug.as_deref()) {
            let valid = slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                errors.add(
                    "slug",
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                );
            }
        }
        if blank(&self.description) {
            errors.add("description", REQUIRED);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl SignupForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > MAX_USERNAME_LEN {
            errors.add(
                "username",
                format!("Ensure this value has at most {MAX_USERNAME_LEN} characters."),
            );
        } else if !username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        if !self.email.trim().contains('@') {
            errors.add("email", "Enter a valid email address.");
        }
        check_new_password(&mut errors, "password", &self.password1, &self.password2);
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if blank(&self.username) {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default, skip_serializing)]
    pub old_password: String,
    #[serde(default, skip_serializing)]
    pub new_password1: String,
    #[serde(default, skip_serializing)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.old_password.is_empty() {
            errors.add("old_password", REQUIRED);
        }
        check_new_password(
            &mut errors,
            "new_password",
            &self.new_password1,
            &self.new_password2,
        );
        errors
    }
}

fn check_new_password(errors: &mut FieldErrors, field: &str, first: &str, second: &str) {
    let first_field = format!("{field}1");
    let second_field = format!("{field}2");
    if first.is_empty() {
        errors.add(&first_field, REQUIRED);
    } else if first.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            &first_field,
            format!("This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."),
        );
    }
    if first != second {
        errors.add(&second_field, "The two password fields didn't match.");
    }
}
