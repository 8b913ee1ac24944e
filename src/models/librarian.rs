//! Librarian (staff) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Staff role. Only `admin` may register new librarians or list staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Librarian record. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Librarian {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password: String,
    pub employee_id: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Librarian {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Access denied. Admin only.".to_string(),
            ))
        }
    }
}

/// Register librarian request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLibrarian {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub employee_id: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    /// Role slug, defaults to `librarian` when omitted
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Update own profile request. Only name, phone and password may change.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

impl UpdateProfile {
    const ALLOWED_FIELDS: [&'static str; 3] = ["name", "phone", "password"];

    /// Parse a patch body, rejecting the whole request if any field falls
    /// outside the whitelist.
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

/// JWT claims bound to a librarian identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Librarian id
    pub sub: i32,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(librarian_id: i32, validity_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: librarian_id,
            iat: now,
            exp: now + validity_hours as i64 * 3600,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and validate a JWT token (signature and expiry)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parses_known_slugs() {
        assert_eq!("librarian".parse::<Role>().unwrap(), Role::Librarian);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("patron".parse::<Role>().is_err());
    }

    #[test]
    fn token_round_trip() {
        let claims = Claims::new(42, 168);
        let token = claims.create_token("test-secret").unwrap();
        let decoded = Claims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.exp, claims.iat + 168 * 3600);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = Claims::new(1, 1).create_token("secret-a").unwrap();
        assert!(Claims::from_token(&token, "secret-b").is_err());
    }

    #[test]
    fn token_rejects_expired() {
        let claims = Claims {
            sub: 1,
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = claims.create_token("test-secret").unwrap();
        assert!(Claims::from_token(&token, "test-secret").is_err());
    }

    #[test]
    fn profile_patch_accepts_whitelisted_fields() {
        let patch = UpdateProfile::from_patch(json!({"name": "Ana", "phone": "555"})).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Ana"));
        assert_eq!(patch.phone.as_deref(), Some("555"));
        assert!(patch.password.is_none());
    }

    #[test]
    fn profile_patch_rejects_unknown_field_entirely() {
        let err = UpdateProfile::from_patch(json!({"name": "Ana", "role": "admin"})).unwrap_err();
        assert!(matches!(err, crate::AppError::Validation(_)));
    }

    #[test]
    fn librarian_serializes_without_password() {
        let librarian = Librarian {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.org".to_string(),
            password: "$argon2id$hash".to_string(),
            employee_id: "EMP-1".to_string(),
            phone: "555".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&librarian).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["employeeId"], "EMP-1");
        assert_eq!(value["role"], "admin");
    }
}
