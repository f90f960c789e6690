//! Filter parameters for listing users.

use serde::{Deserialize, Serialize};

use gatehouse_core::types::PageRequest;
use gatehouse_core::types::pagination::DEFAULT_PAGE_SIZE;

use super::role::UserRole;

/// Filters and paging for the user list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size (1..=100, default 10).
    #[serde(default)]
    pub limit: Option<u64>,
    /// Case-insensitive substring matched against names and email.
    #[serde(default)]
    pub search: Option<String>,
    /// Only users with this role.
    #[serde(default)]
    pub role: Option<UserRole>,
    /// Only active (or inactive) users.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UserQuery {
    /// Clamped paging parameters.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Canonical serialization used as the query cache key suffix.
    ///
    /// Two queries that select the same rows produce the same fingerprint:
    /// paging is clamped, the search term is trimmed and lowercased, and
    /// fields always appear in the same order.
    pub fn fingerprint(&self) -> String {
        let page = self.page_request();
        let search = self.search_term().unwrap_or_default().to_lowercase();
        let role = self.role.map(|r| r.as_str()).unwrap_or_default();
        let active = self.is_active.map(|a| a.to_string()).unwrap_or_default();
        format!(
            "page={}&limit={}&search={}&role={}&isActive={}",
            page.page, page.limit, search, role, active
        )
    }
}
