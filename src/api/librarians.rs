//! Librarian (staff) endpoints: registration, login, profile

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::librarian::{CreateLibrarian, Librarian, LoginRequest},
};

use super::AuthenticatedLibrarian;

/// Authentication response: the identity plus a fresh bearer token
#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub librarian: Librarian,
    pub token: String,
}

/// Register a new librarian (admin only)
#[utoipa::path(
    post,
    path = "/librarians/register",
    tag = "librarians",
    security(("bearer_auth" = [])),
    request_body = CreateLibrarian,
    responses(
        (status = 201, description = "Librarian created", body = AuthResponse),
        (status = 400, description = "Invalid input or duplicate email/employee ID"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(librarian): AuthenticatedLibrarian,
    Json(request): Json<CreateLibrarian>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    librarian.require_admin()?;

    let (created, token) = state.services.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            librarian: created,
            token,
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/librarians/login",
    tag = "librarians",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (librarian, token) = state.services.auth.login(&request.email, &request.password).await?;
    Ok(Json(AuthResponse { librarian, token }))
}

/// List all librarians (admin only)
#[utoipa::path(
    get,
    path = "/librarians",
    tag = "librarians",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of librarians", body = Vec<Librarian>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(librarian): AuthenticatedLibrarian,
) -> AppResult<Json<Vec<Librarian>>> {
    librarian.require_admin()?;

    let librarians = state.services.auth.list().await?;
    Ok(Json(librarians))
}

/// Get the current librarian's profile
#[utoipa::path(
    get,
    path = "/librarians/profile",
    tag = "librarians",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current identity", body = Librarian),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(
    AuthenticatedLibrarian(librarian): AuthenticatedLibrarian,
) -> Json<Librarian> {
    Json(librarian)
}

/// Update the current librarian's profile (name, phone, password only)
#[utoipa::path(
    patch,
    path = "/librarians/profile",
    tag = "librarians",
    security(("bearer_auth" = [])),
    request_body = crate::models::librarian::UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = Librarian),
        (status = 400, description = "Patch contains a field outside the whitelist"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(librarian): AuthenticatedLibrarian,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<Librarian>> {
    let updated = state.services.auth.update_profile(librarian.id, patch).await?;
    Ok(Json(updated))
}
