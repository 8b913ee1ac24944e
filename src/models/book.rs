//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Science,
    Technology,
    History,
    Biography,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fiction => "Fiction",
            Category::NonFiction => "Non-Fiction",
            Category::Science => "Science",
            Category::Technology => "Technology",
            Category::History => "History",
            Category::Biography => "Biography",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fiction" => Ok(Category::Fiction),
            "non-fiction" => Ok(Category::NonFiction),
            "science" => Ok(Category::Science),
            "technology" => Ok(Category::Technology),
            "history" => Ok(Category::History),
            "biography" => Ok(Category::Biography),
            "other" => Ok(Category::Other),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for Category {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Category {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Category {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Circulation status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
    Maintenance,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Reserved => "reserved",
            BookStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "reserved" => Ok(BookStatus::Reserved),
            "maintenance" => Ok(BookStatus::Maintenance),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book record
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: Category,
    pub publication_year: i32,
    pub publisher: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: String,
    pub description: Option<String>,
    pub cover_image: String,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Take one copy out of circulation for a borrow.
    ///
    /// Fails when no copies are left; the last copy flips the status to
    /// `borrowed`.
    pub fn checkout(&mut self) -> AppResult<()> {
        if self.available_copies < 1 {
            return Err(AppError::Conflict("No copies available".to_string()));
        }
        self.available_copies -= 1;
        if self.available_copies == 0 {
            self.status = BookStatus::Borrowed;
        }
        Ok(())
    }

    /// Put a returned copy back into circulation.
    pub fn check_in(&mut self) {
        self.available_copies += 1;
        self.status = if self.available_copies > 0 {
            BookStatus::Available
        } else {
            BookStatus::Borrowed
        };
    }
}

/// Create book request. `availableCopies` is ignored on input: a new book
/// always starts with every copy available.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    /// Category name, validated against the closed set
    pub category: String,
    pub publication_year: i32,
    #[validate(length(min = 1, message = "Publisher is required"))]
    pub publisher: String,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: i32,
    #[validate(length(min = 1, message = "Shelf location is required"))]
    pub shelf_location: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub available_copies: Option<i32>,
}

/// Update book request: direct field replacement, absent fields keep their
/// stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub total_copies: Option<i32>,
    pub available_copies: Option<i32>,
    pub shelf_location: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(available: i32, total: i32) -> Book {
        Book {
            id: 1,
            title: "The Trial".to_string(),
            author: "Franz Kafka".to_string(),
            isbn: "978-0805209990".to_string(),
            category: Category::Fiction,
            publication_year: 1925,
            publisher: "Verlag Die Schmiede".to_string(),
            total_copies: total,
            available_copies: available,
            shelf_location: "A-12".to_string(),
            description: None,
            cover_image: "default-cover.jpg".to_string(),
            status: if available > 0 {
                BookStatus::Available
            } else {
                BookStatus::Borrowed
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn checkout_decrements_and_flips_status_at_zero() {
        let mut b = book(2, 3);
        b.checkout().unwrap();
        assert_eq!(b.available_copies, 1);
        assert_eq!(b.status, BookStatus::Available);

        b.checkout().unwrap();
        assert_eq!(b.available_copies, 0);
        assert_eq!(b.status, BookStatus::Borrowed);
    }

    #[test]
    fn checkout_fails_without_copies_and_mutates_nothing() {
        let mut b = book(0, 3);
        let err = b.checkout().unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(b.available_copies, 0);
        assert_eq!(b.status, BookStatus::Borrowed);
    }

    #[test]
    fn check_in_increments_and_restores_availability() {
        let mut b = book(0, 3);
        b.check_in();
        assert_eq!(b.available_copies, 1);
        assert_eq!(b.status, BookStatus::Available);
    }

    #[test]
    fn category_parsing_is_case_insensitive_and_closed() {
        assert_eq!("non-fiction".parse::<Category>().unwrap(), Category::NonFiction);
        assert_eq!("SCIENCE".parse::<Category>().unwrap(), Category::Science);
        assert!("poetry".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_with_original_labels() {
        assert_eq!(
            serde_json::to_value(Category::NonFiction).unwrap(),
            serde_json::json!("Non-Fiction")
        );
    }
}
