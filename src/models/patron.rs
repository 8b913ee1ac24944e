//! Patron (library member) model and the borrow/return state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Loan period applied to every borrow
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Flat fine per overdue day, in currency units
pub const FINE_PER_DAY: i64 = 5;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Membership tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Basic,
    Premium,
    Student,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Basic => "basic",
            MembershipType::Premium => "premium",
            MembershipType::Student => "student",
        }
    }
}

impl std::fmt::Display for MembershipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(MembershipType::Basic),
            "premium" => Ok(MembershipType::Premium),
            "student" => Ok(MembershipType::Student),
            _ => Err(format!("Invalid membership type: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for MembershipType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for MembershipType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for MembershipType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// One entry in a patron's borrow history. Entries are appended on borrow and
/// mutated in place on return, never removed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub book_id: i32,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_date: Option<DateTime<Utc>>,
}

/// Patron record. The borrow history is stored as an embedded JSON document,
/// mirroring the original document-store layout.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patron {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Member code shown on the library card (wire name `userId`)
    pub user_id: String,
    pub phone: String,
    pub address: String,
    pub membership_type: MembershipType,
    pub membership_date: DateTime<Utc>,
    #[schema(value_type = Vec<BorrowRecord>)]
    pub borrowed_books: Json<Vec<BorrowRecord>>,
    pub fines: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Patron {
    /// Append a borrow record with a 14-day due date.
    pub fn borrow_book(&mut self, book_id: i32, now: DateTime<Utc>) {
        self.borrowed_books.0.push(BorrowRecord {
            book_id,
            borrowed_date: now,
            due_date: now + Duration::days(LOAN_PERIOD_DAYS),
            returned: false,
            returned_date: None,
        });
    }

    /// Close the first unreturned borrow record for `book_id` and accrue any
    /// overdue fine. Returns the fine charged.
    pub fn return_book(&mut self, book_id: i32, now: DateTime<Utc>) -> AppResult<i64> {
        let record = self
            .borrowed_books
            .0
            .iter_mut()
            .find(|r| r.book_id == book_id && !r.returned)
            .ok_or_else(|| AppError::Conflict("Book not borrowed by this user".to_string()))?;

        record.returned = true;
        record.returned_date = Some(now);

        let fine = overdue_fine(record.due_date, now);
        self.fines += fine;
        Ok(fine)
    }
}

/// Fine for a return at `returned_at` against `due_date`: 5 currency units
/// per started overdue day, no cap and no grace period.
pub fn overdue_fine(due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    if returned_at <= due_date {
        return 0;
    }
    let overdue_ms = (returned_at - due_date).num_milliseconds();
    let days_overdue = (overdue_ms + MS_PER_DAY - 1) / MS_PER_DAY;
    days_overdue * FINE_PER_DAY
}

/// Create patron request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatron {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    /// Membership tier slug, defaults to `basic` when omitted
    pub membership_type: Option<String>,
}

/// Update patron request. Only the whitelisted fields may change.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatron {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_type: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdatePatron {
    const ALLOWED_FIELDS: [&'static str; 6] =
        ["name", "email", "phone", "address", "membershipType", "isActive"];

    /// Parse a patch body, rejecting the whole request if any field falls
    /// outside the whitelist. All-or-nothing: a single unknown key means no
    /// field is applied.
    pub fn from_patch(patch: serde_json::Value) -> AppResult<Self> {
        let serde_json::Value::Object(map) = patch else {
            return Err(AppError::Validation("Invalid updates".to_string()));
        };

        if map.keys().any(|k| !Self::ALLOWED_FIELDS.contains(&k.as_str())) {
            return Err(AppError::Validation("Invalid updates".to_string()));
        }

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patron() -> Patron {
        Patron {
            id: 7,
            name: "Iris Martin".to_string(),
            email: "iris@example.org".to_string(),
            user_id: "M-0007".to_string(),
            phone: "555-0107".to_string(),
            address: "12 Rue des Livres".to_string(),
            membership_type: MembershipType::Basic,
            membership_date: Utc::now(),
            borrowed_books: Json(Vec::new()),
            fines: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn borrow_appends_record_with_14_day_due_date() {
        let mut p = patron();
        let now = Utc::now();
        p.borrow_book(3, now);

        assert_eq!(p.borrowed_books.0.len(), 1);
        let record = &p.borrowed_books.0[0];
        assert_eq!(record.book_id, 3);
        assert_eq!(record.due_date, now + Duration::days(14));
        assert!(!record.returned);
        assert!(record.returned_date.is_none());
    }

    #[test]
    fn return_without_matching_borrow_is_a_conflict() {
        let mut p = patron();
        let err = p.return_book(3, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(p.fines, 0);
        assert!(p.borrowed_books.0.is_empty());
    }

    #[test]
    fn return_of_already_returned_book_is_a_conflict() {
        let mut p = patron();
        let now = Utc::now();
        p.borrow_book(3, now);
        p.return_book(3, now).unwrap();

        assert!(p.return_book(3, now).is_err());
    }

    #[test]
    fn on_time_return_charges_nothing() {
        let mut p = patron();
        let borrowed = Utc::now();
        p.borrow_book(3, borrowed);

        let fine = p.return_book(3, borrowed + Duration::days(10)).unwrap();
        assert_eq!(fine, 0);
        assert_eq!(p.fines, 0);
        let record = &p.borrowed_books.0[0];
        assert!(record.returned);
        assert!(record.returned_date.is_some());
    }

    #[test]
    fn overdue_return_charges_five_per_started_day() {
        let mut p = patron();
        let borrowed = Utc::now();
        p.borrow_book(3, borrowed);

        // 20 days out on a 14-day loan: 6 days overdue
        let fine = p.return_book(3, borrowed + Duration::days(20)).unwrap();
        assert_eq!(fine, 30);
        assert_eq!(p.fines, 30);
    }

    #[test]
    fn partial_overdue_day_rounds_up() {
        let due = Utc::now();
        assert_eq!(overdue_fine(due, due), 0);
        assert_eq!(overdue_fine(due, due + Duration::hours(1)), 5);
        assert_eq!(overdue_fine(due, due + Duration::hours(25)), 10);
        assert_eq!(overdue_fine(due, due + Duration::days(3)), 15);
    }

    #[test]
    fn fines_accumulate_across_returns() {
        let mut p = patron();
        let borrowed = Utc::now();
        p.borrow_book(1, borrowed);
        p.borrow_book(2, borrowed);

        p.return_book(1, borrowed + Duration::days(15)).unwrap();
        p.return_book(2, borrowed + Duration::days(16)).unwrap();
        assert_eq!(p.fines, 5 + 10);
    }

    #[test]
    fn return_closes_first_unreturned_record_only() {
        // The data model intends at most one active borrow per book, but a
        // double borrow is not blocked; the return must close the oldest entry.
        let mut p = patron();
        let now = Utc::now();
        p.borrow_book(3, now);
        p.borrow_book(3, now + Duration::hours(1));

        p.return_book(3, now + Duration::days(1)).unwrap();
        assert!(p.borrowed_books.0[0].returned);
        assert!(!p.borrowed_books.0[1].returned);
    }

    #[test]
    fn patch_accepts_whitelisted_fields() {
        let patch = UpdatePatron::from_patch(json!({
            "name": "Iris M.",
            "membershipType": "premium",
            "isActive": false
        }))
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some("Iris M."));
        assert_eq!(patch.membership_type.as_deref(), Some("premium"));
        assert_eq!(patch.is_active, Some(false));
    }

    #[test]
    fn patch_with_unknown_field_applies_nothing() {
        let err = UpdatePatron::from_patch(json!({
            "name": "Iris M.",
            "fines": 0
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn patch_with_non_object_body_is_rejected() {
        assert!(UpdatePatron::from_patch(json!("name")).is_err());
    }
}
