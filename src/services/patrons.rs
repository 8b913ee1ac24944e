//! Patron management service, including the borrow/return workflow

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        patron::{CreatePatron, MembershipType, Patron, UpdatePatron},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PatronsService {
    repository: Repository,
}

impl PatronsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new patron
    pub async fn create(&self, patron: CreatePatron) -> AppResult<Patron> {
        patron
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let membership_type = match patron.membership_type.as_deref() {
            Some(slug) => slug.parse::<MembershipType>().map_err(AppError::Validation)?,
            None => MembershipType::Basic,
        };

        if self.repository.patrons.email_exists(&patron.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        if self.repository.patrons.user_id_exists(&patron.user_id).await? {
            return Err(AppError::Conflict("User ID already exists".to_string()));
        }

        self.repository.patrons.create(&patron, membership_type).await
    }

    /// List all patrons
    pub async fn list(&self) -> AppResult<Vec<Patron>> {
        self.repository.patrons.list().await
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Patron> {
        self.repository.patrons.get_by_id(id).await
    }

    /// Update whitelisted patron fields. The patch is all-or-nothing: any
    /// field outside the whitelist rejects the whole request.
    pub async fn update(&self, id: i32, patch: serde_json::Value) -> AppResult<Patron> {
        let patron = UpdatePatron::from_patch(patch)?;
        patron
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let membership_type = match patron.membership_type.as_deref() {
            Some(slug) => Some(slug.parse::<MembershipType>().map_err(AppError::Validation)?),
            None => None,
        };

        if let Some(ref email) = patron.email {
            if self.repository.patrons.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        self.repository.patrons.update(id, &patron, membership_type).await
    }

    /// Delete a patron
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.patrons.delete(id).await
    }

    /// Borrow a book for a patron: append a borrow record with a 14-day due
    /// date and take one copy out of circulation.
    ///
    /// The patron and book rows are persisted with two independent UPDATE
    /// statements; a crash between them can leave the records inconsistent.
    /// The availability check and decrement are likewise not atomic under
    /// concurrent borrows of the last copy.
    pub async fn borrow(&self, patron_id: i32, book_id: i32) -> AppResult<(Patron, Book)> {
        let mut patron = self.repository.patrons.get_by_id(patron_id).await?;
        let mut book = self.repository.books.get_by_id(book_id).await?;

        book.checkout()?;
        patron.borrow_book(book.id, Utc::now());

        self.repository.patrons.save_circulation(&patron).await?;
        self.repository.books.save_circulation(&book).await?;

        tracing::info!(
            patron_id,
            book_id,
            available_copies = book.available_copies,
            "Book borrowed"
        );

        Ok((patron, book))
    }

    /// Return a borrowed book: close the first unreturned record for the
    /// book, accrue any overdue fine, and put the copy back into circulation.
    pub async fn return_book(&self, patron_id: i32, book_id: i32) -> AppResult<(Patron, Book)> {
        let mut patron = self.repository.patrons.get_by_id(patron_id).await?;
        let mut book = self.repository.books.get_by_id(book_id).await?;

        let fine = patron.return_book(book.id, Utc::now())?;
        book.check_in();

        self.repository.patrons.save_circulation(&patron).await?;
        self.repository.books.save_circulation(&book).await?;

        tracing::info!(
            patron_id,
            book_id,
            fine_charged = fine,
            available_copies = book.available_copies,
            "Book returned"
        );

        Ok((patron, book))
    }
}
