//! Repository layer for database operations

pub mod books;
pub mod librarians;
pub mod patrons;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub librarians: librarians::LibrariansRepository,
    pub patrons: patrons::PatronsRepository,
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            librarians: librarians::LibrariansRepository::new(pool.clone()),
            patrons: patrons::PatronsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            pool,
        }
    }
}
