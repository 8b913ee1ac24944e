//! Patron endpoints: CRUD plus the borrow/return workflow

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::Book, patron::{CreatePatron, Patron}},
};

use super::AuthenticatedLibrarian;

/// Simple confirmation message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Borrow/return response carrying both updated records
#[derive(Serialize, ToSchema)]
pub struct CirculationResponse {
    pub message: String,
    pub user: Patron,
    pub book: Book,
}

/// Create a new patron
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreatePatron,
    responses(
        (status = 201, description = "Patron created", body = Patron),
        (status = 400, description = "Invalid input or duplicate email/user ID"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_patron(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
    Json(patron): Json<CreatePatron>,
) -> AppResult<(StatusCode, Json<Patron>)> {
    let created = state.services.patrons.create(patron).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all patrons
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of patrons", body = Vec<Patron>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_patrons(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
) -> AppResult<Json<Vec<Patron>>> {
    let patrons = state.services.patrons.list().await?;
    Ok(Json(patrons))
}

/// Get patron details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patron ID")),
    responses(
        (status = 200, description = "Patron details", body = Patron),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get_patron(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
    Path(id): Path<i32>,
) -> AppResult<Json<Patron>> {
    let patron = state.services.patrons.get_by_id(id).await?;
    Ok(Json(patron))
}

/// Update a patron (whitelisted fields only, all-or-nothing)
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patron ID")),
    request_body = crate::models::patron::UpdatePatron,
    responses(
        (status = 200, description = "Patron updated", body = Patron),
        (status = 400, description = "Patch contains a field outside the whitelist"),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn update_patron(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
    Path(id): Path<i32>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<Patron>> {
    let updated = state.services.patrons.update(id, patch).await?;
    Ok(Json(updated))
}

/// Delete a patron
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patron ID")),
    responses(
        (status = 200, description = "Patron deleted", body = MessageResponse),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn delete_patron(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.patrons.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Borrow a book for a patron
#[utoipa::path(
    post,
    path = "/users/{user_id}/borrow/{book_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "Patron ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book borrowed", body = CirculationResponse),
        (status = 400, description = "No copies available"),
        (status = 404, description = "Patron or book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
    Path((user_id, book_id)): Path<(i32, i32)>,
) -> AppResult<Json<CirculationResponse>> {
    let (patron, book) = state.services.patrons.borrow(user_id, book_id).await?;
    Ok(Json(CirculationResponse {
        message: "Book borrowed successfully".to_string(),
        user: patron,
        book,
    }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/users/{user_id}/return/{book_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "Patron ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = CirculationResponse),
        (status = 400, description = "Book not borrowed by this user"),
        (status = 404, description = "Patron or book not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedLibrarian(_librarian): AuthenticatedLibrarian,
    Path((user_id, book_id)): Path<(i32, i32)>,
) -> AppResult<Json<CirculationResponse>> {
    let (patron, book) = state.services.patrons.return_book(user_id, book_id).await?;
    Ok(Json(CirculationResponse {
        message: "Book returned successfully".to_string(),
        user: patron,
        book,
    }))
}
