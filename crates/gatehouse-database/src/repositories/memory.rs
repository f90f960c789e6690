//! In-process user repository backed by `DashMap`.
//!
//! Used when `database.provider = "memory"` and by the integration tests.
//! Lock order is always `emails` before `users`.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::PageResponse;
use gatehouse_entity::user::{CreateUser, UpdateUser, User, UserQuery};

use super::user::{EMAIL_TAKEN, UserRepository};

/// In-memory user repository.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    /// Users keyed by id.
    users: DashMap<Uuid, User>,
    /// Lowercased email to user id. Enforces uniqueness.
    emails: DashMap<String, Uuid>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the repository holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn matches(user: &User, query: &UserQuery, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        let hit = user.first_name.to_lowercase().contains(needle)
            || user.last_name.to_lowercase().contains(needle)
            || user.email.to_lowercase().contains(needle);
        if !hit {
            return false;
        }
    }
    if query.role.is_some_and(|role| role != user.role) {
        return false;
    }
    if query.is_active.is_some_and(|active| active != user.is_active) {
        return false;
    }
    true
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let id = match self.emails.get(&email.to_lowercase()) {
            Some(id) => *id.value(),
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.emails.contains_key(&email.to_lowercase()))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        match self.emails.entry(data.email.to_lowercase()) {
            Entry::Occupied(_) => Err(AppError::conflict(EMAIL_TAKEN)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::new_v4(),
                    email: data.email.clone(),
                    password_hash: data.password_hash.clone(),
                    first_name: data.first_name.clone(),
                    last_name: data.last_name.clone(),
                    role: data.role,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
        let current_email = self
            .users
            .get(&id)
            .map(|u| u.email.to_lowercase())
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if let Some(new_email) = data.email.as_ref().map(|e| e.to_lowercase()) {
            if new_email != current_email {
                match self.emails.entry(new_email) {
                    Entry::Occupied(_) => return Err(AppError::conflict(EMAIL_TAKEN)),
                    Entry::Vacant(slot) => {
                        slot.insert(id);
                    }
                }
                self.emails.remove(&current_email);
            }
        }

        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &data.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &data.last_name {
            user.last_name = last_name.clone();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<User> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.is_active = false;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list(&self, query: &UserQuery) -> AppResult<PageResponse<User>> {
        let page = query.page_request();
        let needle = query.search_term().map(str::to_lowercase);

        let mut selected: Vec<User> = self
            .users
            .iter()
            .filter(|entry| matches(entry.value(), query, needle.as_deref()))
            .map(|entry| entry.value().clone())
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = selected.len() as u64;
        let items = selected
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(PageResponse::new(items, page, total))
    }
}
