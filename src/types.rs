/// Shared types used across the codebase

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authorization level of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Editor => "EDITOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "EDITOR" => Ok(Role::Editor),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Storage state of an account or content record.
///
/// Purged records are physically removed, so only the two live states are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    SoftDeleted { at: DateTime<Utc> },
}

impl Lifecycle {
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => Lifecycle::SoftDeleted { at },
            None => Lifecycle::Active,
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::SoftDeleted { at } => Some(*at),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }

    /// True when the record was soft deleted strictly before `threshold`
    pub fn is_purgeable(&self, threshold: DateTime<Utc>) -> bool {
        match self {
            Lifecycle::Active => false,
            Lifecycle::SoftDeleted { at } => *at < threshold,
        }
    }
}

/// Offset pagination window, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// Build a window from optional query values. Zero is rejected, oversize limits are clamped.
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Result<Self, String> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);
        if page == 0 {
            return Err("page must be at least 1".to_string());
        }
        if limit == 0 {
            return Err("limit must be at least 1".to_string());
        }
        Ok(Self {
            page,
            limit: limit.min(max_limit),
        })
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// One page of results plus the total number of matching records
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::User, Role::Editor, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
        assert_eq!(serde_json::to_value(Role::Editor).unwrap(), "EDITOR");
    }

    #[test]
    fn page_defaults_and_clamps() {
        let page = Page::new(None, None, 10, 100).unwrap();
        assert_eq!(page, Page { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);

        let page = Page::new(Some(3), Some(500), 10, 100).unwrap();
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset(), 200);

        assert!(Page::new(Some(0), None, 10, 100).is_err());
        assert!(Page::new(None, Some(0), 10, 100).is_err());
    }

    #[test]
    fn purgeable_only_when_deleted_before_threshold() {
        let now = Utc::now();
        assert!(!Lifecycle::Active.is_purgeable(now));
        assert!(Lifecycle::SoftDeleted { at: now - Duration::days(1) }.is_purgeable(now));
        assert!(!Lifecycle::SoftDeleted { at: now }.is_purgeable(now));
    }
}
