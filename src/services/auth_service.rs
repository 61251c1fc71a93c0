use chrono::Utc;
use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use crate::auth::{password, IssuedToken, TokenIssuer};
use crate::database::models::{Account, AccountWithContent, NewAccount};
use crate::database::{StoreError, Stores};
use crate::dto::{LoginRequest, SignUpRequest};
use crate::types::Role;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Account directory operations and the role-transition rules
#[derive(Clone)]
pub struct AuthService {
    stores: Stores,
    tokens: TokenIssuer,
}

/// Emails compare case-insensitively and ignore surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(stores: Stores, tokens: TokenIssuer) -> Self {
        Self { stores, tokens }
    }

    /// Register an account. Public sign-up always passes `Role::User`.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest, role: Role) -> ServiceResult<Account> {
        let email = normalize_email(&request.email);
        let name = request.name.trim().to_string();

        if self.stores.accounts.find_active_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email is already registered".to_string()));
        }
        if self.stores.accounts.find_active_by_name(&name).await?.is_some() {
            return Err(ServiceError::Conflict("Name is already taken".to_string()));
        }

        let password_hash = password::hash_blocking(request.password).await?;
        let account = self
            .stores
            .accounts
            .insert(NewAccount {
                name,
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                // lost a race with a concurrent sign-up
                StoreError::Duplicate(field) => ServiceError::Conflict(format!("Account {} is already registered", field)),
                other => other.into(),
            })?;

        info!("Account {} signed up with role {}", account.id, account.role);
        Ok(account)
    }

    /// Check an email/password pair against active accounts.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> ServiceResult<Account> {
        let email = normalize_email(email);
        let Some(account) = self.stores.accounts.find_active_by_email(&email).await? else {
            warn!("Rejected login attempt");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let matches = password::verify_blocking(password.to_string(), account.password_hash.clone()).await?;
        if !matches {
            warn!("Rejected login attempt for account {}", account.id);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Ok(account)
    }

    pub fn issue_token(&self, account: &Account) -> ServiceResult<IssuedToken> {
        Ok(self.tokens.issue(account)?)
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<IssuedToken> {
        let account = self.validate_credentials(&request.email, &request.password).await?;
        info!("Account {} logged in", account.id);
        self.issue_token(&account)
    }

    /// Resolve a bearer token to its live account. The stored role wins over the token's.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Account> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))?;

        match self.stores.accounts.find_by_id(claims.sub).await? {
            Some(account) if account.is_active() => Ok(account),
            _ => Err(ServiceError::Unauthorized("Account is no longer active".to_string())),
        }
    }

    pub async fn profile(&self, id: i64) -> ServiceResult<Account> {
        match self.stores.accounts.find_by_id(id).await? {
            Some(account) if account.is_active() => Ok(account),
            _ => Err(ServiceError::NotFound(format!("Account {} not found", id))),
        }
    }

    /// Move an account between USER and EDITOR. ADMIN is neither a source nor a target.
    #[tracing::instrument(skip(self))]
    pub async fn update_role(&self, id: i64, target: Role) -> ServiceResult<Account> {
        let mut account = match self.stores.accounts.find_by_id(id).await? {
            Some(account) if account.is_active() => account,
            _ => return Err(ServiceError::NotFound(format!("Account {} not found", id))),
        };

        if account.role == target {
            return Err(ServiceError::Conflict("Role is already up to date".to_string()));
        }
        if account.role == Role::Admin || target == Role::Admin {
            warn!("Refused role change {} -> {} for account {}", account.role, target, id);
            return Err(ServiceError::Conflict("ADMIN role cannot be granted or revoked".to_string()));
        }

        if !self.stores.accounts.update_role(id, target).await? {
            return Err(ServiceError::NotFound(format!("Account {} not found", id)));
        }

        info!("Account {} role changed {} -> {}", id, account.role, target);
        account.role = target;
        Ok(account)
    }

    /// Self-service deletion: only the account itself may delete it
    #[tracing::instrument(skip(self))]
    pub async fn soft_delete_account(&self, acting_id: i64, target_id: i64) -> ServiceResult<()> {
        let account = self
            .stores
            .accounts
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {} not found", target_id)))?;

        if !account.is_active() {
            return Err(ServiceError::Conflict("Account is already deleted".to_string()));
        }
        if account.id != acting_id {
            warn!("Account {} tried to delete account {}", acting_id, target_id);
            return Err(ServiceError::Unauthorized("Accounts can only delete themselves".to_string()));
        }

        if !self.stores.accounts.mark_deleted(target_id, Utc::now()).await? {
            return Err(ServiceError::Conflict("Account is already deleted".to_string()));
        }
        info!("Account {} soft deleted", target_id);
        Ok(())
    }

    /// Every account with the ids of its live content
    pub async fn list_accounts(&self) -> ServiceResult<Vec<AccountWithContent>> {
        let accounts = self.stores.accounts.list().await?;
        let mut posts = self.stores.posts.ids_by_author().await?;
        let mut job_postings = self.stores.job_postings.ids_by_author().await?;
        let mut tea_ratings = self.stores.tea_ratings.ids_by_author().await?;
        let mut magazines = self.stores.magazines.ids_by_author().await?;

        Ok(accounts
            .into_iter()
            .map(|account| {
                let id = account.id;
                AccountWithContent {
                    account,
                    posts: posts.remove(&id).unwrap_or_default(),
                    job_postings: job_postings.remove(&id).unwrap_or_default(),
                    tea_ratings: tea_ratings.remove(&id).unwrap_or_default(),
                    magazines: magazines.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}
