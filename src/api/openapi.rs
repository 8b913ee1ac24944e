//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, librarians, patrons};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library Management Backend REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        // Librarians
        librarians::register,
        librarians::login,
        librarians::list,
        librarians::profile,
        librarians::update_profile,
        // Patrons
        patrons::create_patron,
        patrons::list_patrons,
        patrons::get_patron,
        patrons::update_patron,
        patrons::delete_patron,
        patrons::borrow_book,
        patrons::return_book,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Librarians
            crate::models::librarian::Librarian,
            crate::models::librarian::Role,
            crate::models::librarian::CreateLibrarian,
            crate::models::librarian::LoginRequest,
            crate::models::librarian::UpdateProfile,
            librarians::AuthResponse,
            // Patrons
            crate::models::patron::Patron,
            crate::models::patron::MembershipType,
            crate::models::patron::BorrowRecord,
            crate::models::patron::CreatePatron,
            crate::models::patron::UpdatePatron,
            patrons::MessageResponse,
            patrons::CirculationResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::Category,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "librarians", description = "Librarian authentication and staff management"),
        (name = "users", description = "Patron management and borrow/return workflow"),
        (name = "books", description = "Catalog management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
