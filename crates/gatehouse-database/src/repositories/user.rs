//! User repository trait and PostgreSQL implementation.

use std::fmt::Debug;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_entity::user::{CreateUser, UpdateUser, User, UserQuery};

/// Message returned when an email address is already registered.
pub const EMAIL_TAKEN: &str = "Email is already in use";

/// Primary store for user records.
///
/// The primary store is the source of truth; callers that cache user data
/// must invalidate after every mutating call.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Check whether an email address is already registered (case-insensitive).
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Insert a new user. Fails with `Conflict` on a duplicate email.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Apply a profile patch. Fails with `NotFound` or, on a duplicate email, `Conflict`.
    async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<User>;

    /// Replace a user's password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Soft-delete a user by clearing `is_active`.
    async fn deactivate(&self, id: Uuid) -> AppResult<User>;

    /// List users matching the query, newest first.
    async fn list(&self, query: &UserQuery) -> AppResult<PageResponse<User>>;
}

/// PostgreSQL-backed user repository.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-violation on the email constraint to `Conflict`.
fn map_write_error(e: sqlx::Error, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
            AppError::conflict(EMAIL_TAKEN)
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

const LIST_FILTER: &str = "WHERE ($1::text IS NULL OR first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1) \
     AND ($2::user_role IS NULL OR role = $2) \
     AND ($3::bool IS NULL OR is_active = $3)";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check email", e))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create user"))
    }

    async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), \
                              first_name = COALESCE($3, first_name), \
                              last_name = COALESCE($4, last_name), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to update user"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn list(&self, query: &UserQuery) -> AppResult<PageResponse<User>> {
        let page = query.page_request();
        let pattern = query.search_term().map(|s| format!("%{s}%"));

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {LIST_FILTER}"))
            .bind(&pattern)
            .bind(query.role)
            .bind(query.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let (limit, offset) = sql_window(page);
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {LIST_FILTER} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&pattern)
        .bind(query.role)
        .bind(query.is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page, total as u64))
    }
}

/// `LIMIT`/`OFFSET` as Postgres `BIGINT`s. An offset past `i64::MAX` is
/// clamped, which still selects an empty page.
fn sql_window(page: PageRequest) -> (i64, i64) {
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}
