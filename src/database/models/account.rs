use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Lifecycle, Role};

/// A registered account.
///
/// The password hash is never serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
}

/// Insert payload for a new account; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Account listing entry with the ids of the content each account authored
#[derive(Debug, Clone, Serialize)]
pub struct AccountWithContent {
    #[serde(flatten)]
    pub account: Account,
    pub posts: Vec<i64>,
    pub job_postings: Vec<i64>,
    pub tea_ratings: Vec<i64>,
    pub magazines: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let account = Account {
            id: 1,
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        };

        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "alice@example.com");
        assert_eq!(value["role"], "USER");
        assert_eq!(value["lifecycle"]["state"], "active");
    }
}
