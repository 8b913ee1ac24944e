//! Librarian authentication and staff management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::librarian::{Claims, CreateLibrarian, Librarian, Role, UpdateProfile},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new librarian and issue a token bound to the new identity
    pub async fn register(&self, librarian: CreateLibrarian) -> AppResult<(Librarian, String)> {
        librarian
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let role = match librarian.role.as_deref() {
            Some(slug) => slug.parse::<Role>().map_err(AppError::Validation)?,
            None => Role::Librarian,
        };

        if self.repository.librarians.email_exists(&librarian.email).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        if self
            .repository
            .librarians
            .employee_id_exists(&librarian.employee_id)
            .await?
        {
            return Err(AppError::Conflict("Employee ID already exists".to_string()));
        }

        let password_hash = self.hash_password(&librarian.password)?;
        let created = self
            .repository
            .librarians
            .create(&librarian, &password_hash, role)
            .await?;

        tracing::info!(librarian_id = created.id, role = %created.role, "Librarian registered");

        let token = self.issue_token(&created)?;
        Ok((created, token))
    }

    /// Authenticate by email and password.
    ///
    /// The error is the same whether the email is unknown or the password is
    /// wrong, so callers cannot probe which emails are registered.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(Librarian, String)> {
        let librarian = self
            .repository
            .librarians
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&librarian, password)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&librarian)?;
        Ok((librarian, token))
    }

    /// Resolve a bearer token to a librarian identity. Read-only.
    pub async fn verify(&self, token: &str) -> AppResult<Librarian> {
        let claims = Claims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Please authenticate".to_string()))?;

        // The identity behind a valid token may have been removed since the
        // token was issued.
        self.repository
            .librarians
            .get_by_id(claims.sub)
            .await
            .map_err(|_| AppError::Authentication("Please authenticate".to_string()))
    }

    /// List all librarians
    pub async fn list(&self) -> AppResult<Vec<Librarian>> {
        self.repository.librarians.list().await
    }

    /// Update own profile. The patch is whitelisted to name, phone and
    /// password; a password change is rehashed before storage.
    pub async fn update_profile(
        &self,
        librarian_id: i32,
        patch: serde_json::Value,
    ) -> AppResult<Librarian> {
        let profile = UpdateProfile::from_patch(patch)?;
        profile
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = match profile.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .librarians
            .update_profile(librarian_id, &profile, password_hash)
            .await
    }

    fn issue_token(&self, librarian: &Librarian) -> AppResult<String> {
        Claims::new(librarian.id, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password using Argon2 with a random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, librarian: &Librarian, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&librarian.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
