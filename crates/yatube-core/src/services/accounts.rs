use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::{DomainError, FieldErrors, NON_FIELD_ERRORS, RepoError};
use crate::forms::{LoginForm, PasswordChangeForm, SignupForm};
use crate::ports::{PasswordService, Repositories};

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Registration, credential checks and password changes.
#[derive(Clone)]
pub struct AccountService {
    repos: Repositories,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(repos: Repositories, passwords: Arc<dyn PasswordService>) -> Self {
        Self { repos, passwords }
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<User, DomainError> {
        let mut errors = form.validate();
        let username = form.username.trim();
        if !errors.contains("username") && self.repos.users.find_by_username(username).await?.is_some() {
            errors.add("username", "A user with that username already exists.");
        }
        errors.into_result()?;

        let password_hash = self
            .passwords
            .hash(&form.password1)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let user = User::new(username.to_string(), form.email.trim().to_string(), password_hash)
            .with_name(
                form.first_name.trim().to_string(),
                form.last_name.trim().to_string(),
            );

        match self.repos.users.save(user).await {
            Ok(saved) => {
                tracing::info!(user_id = %saved.id, "User registered");
                Ok(saved)
            }
            Err(RepoError::Constraint(_)) => Err(DomainError::invalid(
                "username",
                "A user with that username already exists.",
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials; failures are reported as a form error.
    pub async fn authenticate(&self, form: &LoginForm) -> Result<User, DomainError> {
        form.validate().into_result()?;
        let user = self.repos.users.find_by_username(form.username.trim()).await?;
        let Some(user) = user else {
            return Err(DomainError::invalid(NON_FIELD_ERRORS, BAD_CREDENTIALS));
        };
        let valid = self
            .passwords
            .verify(&form.password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if valid {
            Ok(user)
        } else {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            Err(DomainError::invalid(NON_FIELD_ERRORS, BAD_CREDENTIALS))
        }
    }

    /// The stored user behind a session, if the account still exists.
    pub async fn session_user(&self, user_id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.repos.users.find_by_id(user_id).await?)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        form: &PasswordChangeForm,
    ) -> Result<(), DomainError> {
        let mut errors: FieldErrors = form.validate();
        let mut user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;
        if !form.old_password.is_empty() {
            let valid = self
                .passwords
                .verify(&form.old_password, &user.password_hash)
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            if !valid {
                errors.add(
                    "old_password",
                    "Your old password was entered incorrectly. Please enter it again.",
                );
            }
        }
        errors.into_result()?;

        let hash = self
            .passwords
            .hash(&form.new_password1)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        user.set_password_hash(hash);
        self.repos.users.save(user).await?;
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
