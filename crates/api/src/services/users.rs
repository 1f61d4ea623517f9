//! Registration, login and account management.

use quill_core::error::CoreError;
use quill_core::types::DbId;
use quill_core::validation::validate_not_blank;
use quill_db::models::user::{CreateUser, UpdateUser, User};
use quill_db::repositories::UserRepo;
use quill_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{issue_token, JwtConfig};
use crate::auth::password::{check_password, hash_password};
use crate::error::{AppError, AppResult};

/// Shared message for unknown email and wrong password alike.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// bcrypt only reads the first 72 bytes.
    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

/// Request body for `PATCH /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 72))]
    pub password: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful authentication response returned by login and registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct UserService;

impl UserService {
    /// Create an account and sign the new user in.
    pub async fn register(
        pool: &DbPool,
        jwt: &JwtConfig,
        input: CreateUserRequest,
    ) -> AppResult<AuthResponse> {
        input.validate().map_err(CoreError::from)?;

        let password_hash = hash_off_thread(input.password).await?;
        let user = UserRepo::create(
            pool,
            &CreateUser {
                name: input.name.trim().to_string(),
                email: normalize_email(&input.email),
                password_hash,
            },
        )
        .await?;

        tracing::info!(user_id = user.id, "User registered");

        auth_response(user, jwt)
    }

    /// Exchange email and password for a token.
    ///
    /// Unknown email and wrong password produce the same 401.
    pub async fn login(
        pool: &DbPool,
        jwt: &JwtConfig,
        input: LoginRequest,
    ) -> AppResult<AuthResponse> {
        input.validate().map_err(CoreError::from)?;

        let user = UserRepo::find_by_email(pool, &normalize_email(&input.email))
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || check_password(&input.password, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Password check task failed: {e}")))?;

        if !valid {
            return Err(AppError::Core(CoreError::Unauthorized(
                INVALID_CREDENTIALS.into(),
            )));
        }

        tracing::info!(user_id = user.id, "User logged in");

        auth_response(user, jwt)
    }

    pub async fn get(pool: &DbPool, id: DbId) -> AppResult<User> {
        UserRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }

    /// Partially update an account. Existence is checked before ownership.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        caller: DbId,
        input: UpdateUserRequest,
    ) -> AppResult<User> {
        Self::get(pool, id).await?;
        if id != caller {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only update your own account".into(),
            )));
        }
        input.validate().map_err(CoreError::from)?;

        let password_hash = match input.password {
            Some(password) => Some(hash_off_thread(password).await?),
            None => None,
        };

        let user = UserRepo::update(
            pool,
            id,
            &UpdateUser {
                name: input.name.map(|n| n.trim().to_string()),
                email: input.email.as_deref().map(normalize_email),
                password_hash,
            },
        )
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

        tracing::info!(user_id = id, "User updated");

        Ok(user)
    }

    /// Delete an account. Existence is checked before ownership.
    pub async fn delete(pool: &DbPool, id: DbId, caller: DbId) -> AppResult<()> {
        Self::get(pool, id).await?;
        if id != caller {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only delete your own account".into(),
            )));
        }

        if !UserRepo::delete(pool, id).await? {
            return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
        }

        tracing::info!(user_id = id, "User deleted");

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// bcrypt is deliberately slow; keep it off the async workers.
async fn hash_off_thread(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

fn auth_response(user: User, jwt: &JwtConfig) -> AppResult<AuthResponse> {
    let token = issue_token(user.id, &user.email, &user.name, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        token,
        expires_in: jwt.expires_in_secs(),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateUserRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "long-enough".into(),
        };
        assert!(ok.validate().is_ok());

        let blank_name = CreateUserRequest {
            name: "   ".into(),
            ..ok_request()
        };
        assert!(blank_name.validate().is_err());

        let bad_email = CreateUserRequest {
            email: "not-an-email".into(),
            ..ok_request()
        };
        assert!(bad_email.validate().is_err());

        let short_password = CreateUserRequest {
            password: "short".into(),
            ..ok_request()
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let short_name = UpdateUserRequest {
            name: Some("Al".into()),
            ..Default::default()
        };
        assert!(short_name.validate().is_err(), "names need at least 3 characters");
    }

    fn ok_request() -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "long-enough".into(),
        }
    }
}
