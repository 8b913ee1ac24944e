//! API handlers for the Libris REST endpoints

pub mod books;
pub mod health;
pub mod librarians;
pub mod openapi;
pub mod patrons;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::librarian::Librarian, AppState};

/// Extractor resolving the bearer token to a librarian identity.
///
/// The token is decoded and the librarian is re-loaded from storage, so a
/// deleted identity cannot keep using an old token.
pub struct AuthenticatedLibrarian(pub Librarian);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedLibrarian {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Please authenticate".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Please authenticate".to_string()))?;

        let librarian = state.services.auth.verify(token).await?;

        Ok(AuthenticatedLibrarian(librarian))
    }
}
