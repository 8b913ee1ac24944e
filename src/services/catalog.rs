//! Catalog (book) management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookStatus, Category, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog. `available_copies` always starts at
    /// `total_copies`, whatever the caller supplied.
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let category = book.category.parse::<Category>().map_err(AppError::Validation)?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict("ISBN already exists".to_string()));
        }

        self.repository.books.create(&book, category).await
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Update a book by direct field replacement
    pub async fn update(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        let category = match book.category.as_deref() {
            Some(slug) => Some(slug.parse::<Category>().map_err(AppError::Validation)?),
            None => None,
        };
        let status = match book.status.as_deref() {
            Some(slug) => Some(slug.parse::<BookStatus>().map_err(AppError::Validation)?),
            None => None,
        };

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict("ISBN already exists".to_string()));
            }
        }

        self.repository.books.update(id, &book, category, status).await
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
