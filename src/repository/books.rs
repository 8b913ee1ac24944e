//! Books repository for database operations

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookStatus, Category, CreateBook, UpdateBook},
};
use sqlx::{Pool, Postgres};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Check whether an ISBN is already catalogued, optionally excluding one
    /// book (for updates).
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new book. Every copy starts available, whatever the caller
    /// supplied for `available_copies`.
    pub async fn create(&self, book: &CreateBook, category: Category) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books
                (title, author, isbn, category, publication_year, publisher,
                 total_copies, available_copies, shelf_location, description, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(category)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(book.total_copies)
        .bind(&book.shelf_location)
        .bind(&book.description)
        .bind(book.cover_image.as_deref().unwrap_or("default-cover.jpg"))
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update book fields by direct replacement
    pub async fn update(
        &self,
        id: i32,
        book: &UpdateBook,
        category: Option<Category>,
        status: Option<BookStatus>,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                category = COALESCE($5, category),
                publication_year = COALESCE($6, publication_year),
                publisher = COALESCE($7, publisher),
                total_copies = COALESCE($8, total_copies),
                available_copies = COALESCE($9, available_copies),
                shelf_location = COALESCE($10, shelf_location),
                description = COALESCE($11, description),
                cover_image = COALESCE($12, cover_image),
                status = COALESCE($13, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(category)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(&book.shelf_location)
        .bind(&book.description)
        .bind(&book.cover_image)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Persist the availability counter and status after a borrow or return
    /// transition.
    pub async fn save_circulation(&self, book: &Book) -> AppResult<()> {
        let result = sqlx::query("UPDATE books SET available_copies = $2, status = $3 WHERE id = $1")
            .bind(book.id)
            .bind(book.available_copies)
            .bind(book.status)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", book.id)));
        }
        Ok(())
    }
}
