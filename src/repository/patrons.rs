//! Patrons repository for database operations

use sqlx::{types::Json, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::patron::{CreatePatron, MembershipType, Patron, UpdatePatron},
};

#[derive(Clone)]
pub struct PatronsRepository {
    pool: Pool<Postgres>,
}

impl PatronsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("SELECT * FROM patrons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Patron with id {} not found", id)))
    }

    /// List all patrons
    pub async fn list(&self) -> AppResult<Vec<Patron>> {
        let patrons = sqlx::query_as::<_, Patron>("SELECT * FROM patrons ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(patrons)
    }

    /// Check whether an email is already registered, optionally excluding one
    /// patron (for updates).
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM patrons WHERE lower(email) = lower($1) AND ($2::int IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check whether a member code is already taken
    pub async fn user_id_exists(&self, user_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patrons WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert a new patron with an empty borrow history
    pub async fn create(
        &self,
        patron: &CreatePatron,
        membership_type: MembershipType,
    ) -> AppResult<Patron> {
        let created = sqlx::query_as::<_, Patron>(
            r#"
            INSERT INTO patrons (name, email, user_id, phone, address, membership_type)
            VALUES ($1, lower($2), $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&patron.name)
        .bind(&patron.email)
        .bind(&patron.user_id)
        .bind(&patron.phone)
        .bind(&patron.address)
        .bind(membership_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update whitelisted patron fields
    pub async fn update(
        &self,
        id: i32,
        patron: &UpdatePatron,
        membership_type: Option<MembershipType>,
    ) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>(
            r#"
            UPDATE patrons
            SET name = COALESCE($2, name),
                email = COALESCE(lower($3), email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                membership_type = COALESCE($6, membership_type),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patron.name)
        .bind(&patron.email)
        .bind(&patron.phone)
        .bind(&patron.address)
        .bind(membership_type)
        .bind(patron.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Patron with id {} not found", id)))
    }

    /// Delete a patron
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM patrons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Patron with id {} not found", id)));
        }
        Ok(())
    }

    /// Persist the borrow history and fine accumulator after a borrow or
    /// return transition.
    pub async fn save_circulation(&self, patron: &Patron) -> AppResult<()> {
        let result = sqlx::query("UPDATE patrons SET borrowed_books = $2, fines = $3 WHERE id = $1")
            .bind(patron.id)
            .bind(Json(&patron.borrowed_books.0))
            .bind(patron.fines)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Patron with id {} not found",
                patron.id
            )));
        }
        Ok(())
    }
}
