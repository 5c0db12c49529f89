//! Account registration, login and admin bootstrap.

use std::sync::Arc;

use crate::domain::{Role, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, TokenService, UserRepository};
use crate::validation::Validator;

const USERNAME_MIN: usize = 3;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A freshly issued bearer token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    pub async fn register(&self, input: NewAccount) -> Result<IssuedToken, DomainError> {
        let user = self.create_account(input, Role::User).await?;
        self.issue(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, DomainError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(DomainError::Unauthorized);
        }

        self.issue(user)
    }

    /// Make sure an administrator account with `account.email` exists.
    pub async fn ensure_admin(&self, account: NewAccount) -> Result<User, DomainError> {
        if let Some(existing) = self.users.find_by_email(&normalize_email(&account.email)).await? {
            if existing.role != Role::Admin {
                tracing::warn!(user_id = %existing.id, "Bootstrap admin email belongs to a non-admin account");
            }
            return Ok(existing);
        }

        let admin = self.create_account(account, Role::Admin).await?;
        tracing::info!(user_id = %admin.id, "Bootstrap admin account created");
        Ok(admin)
    }

    async fn create_account(&self, input: NewAccount, role: Role) -> Result<User, DomainError> {
        let mut v = Validator::new();
        let username = v.min_chars("username", &input.username, USERNAME_MIN);
        let email = normalize_email(&input.email);
        if !is_plausible_email(&email) {
            v.push("email", "must be a valid email address");
        }
        if input.password.chars().count() < PASSWORD_MIN {
            v.push(
                "password",
                format!("must be at least {PASSWORD_MIN} characters long"),
            );
        }
        v.finish(())?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".into()));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already taken".into()));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(username, email, password_hash, role);
        self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::Conflict("Account already exists".into()),
            other => other.into(),
        })
    }

    fn issue(&self, user: User) -> Result<IssuedToken, DomainError> {
        let access_token = self
            .tokens
            .generate_token(user.id, &user.username, user.role)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.tokens.expiration_seconds().max(0) as u64,
            user,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("jo@example.com"));
        assert!(!is_plausible_email("jo.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("jo@localhost"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jo@Example.COM "), "jo@example.com");
    }
}
