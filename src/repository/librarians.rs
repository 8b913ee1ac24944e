//! Librarians repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::librarian::{CreateLibrarian, Librarian, Role, UpdateProfile},
};

#[derive(Clone)]
pub struct LibrariansRepository {
    pool: Pool<Postgres>,
}

impl LibrariansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get librarian by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Librarian> {
        sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))
    }

    /// Get librarian by email, if one exists
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Librarian>> {
        let librarian =
            sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(librarian)
    }

    /// List all librarians
    pub async fn list(&self) -> AppResult<Vec<Librarian>> {
        let librarians = sqlx::query_as::<_, Librarian>("SELECT * FROM librarians ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(librarians)
    }

    /// Check whether an email is already registered
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM librarians WHERE lower(email) = lower($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check whether an employee ID is already registered
    pub async fn employee_id_exists(&self, employee_id: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM librarians WHERE employee_id = $1)")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a new librarian. `password_hash` must already be hashed.
    pub async fn create(
        &self,
        librarian: &CreateLibrarian,
        password_hash: &str,
        role: Role,
    ) -> AppResult<Librarian> {
        let created = sqlx::query_as::<_, Librarian>(
            r#"
            INSERT INTO librarians (name, email, password, employee_id, phone, role)
            VALUES ($1, lower($2), $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&librarian.name)
        .bind(&librarian.email)
        .bind(password_hash)
        .bind(&librarian.employee_id)
        .bind(&librarian.phone)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update own profile fields; `password_hash` replaces the stored hash
    /// when present.
    pub async fn update_profile(
        &self,
        id: i32,
        profile: &UpdateProfile,
        password_hash: Option<String>,
    ) -> AppResult<Librarian> {
        sqlx::query_as::<_, Librarian>(
            r#"
            UPDATE librarians
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                password = COALESCE($4, password)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))
    }
}
