use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::index::Status;
use crate::models::{
    user_id, AuthToken, CreateUser, ListQuery, LoginRequest, SortOrder, UpdateUser, User,
    UserResponse,
};
use crate::password::{Argon2Hasher, PasswordHasher};
use crate::store::CredentialStore;
use crate::token::{self, TokenClaims, TokenConfig, TokenHeader};

/// Service layer for the user directory and token issuance.
///
/// Holds the single [`CredentialStore`] for the process. Mutations take the
/// write lock; traversals and lookups share the read lock.
pub struct UserService<H: PasswordHasher = Argon2Hasher> {
    store: Arc<RwLock<CredentialStore>>,
    hasher: Arc<H>,
    tokens: Arc<TokenConfig>,
}

impl<H: PasswordHasher> Clone for UserService<H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl UserService<Argon2Hasher> {
    pub fn new(tokens: TokenConfig) -> Self {
        Self::with_hasher(Argon2Hasher::new(), tokens)
    }
}

impl<H: PasswordHasher> UserService<H> {
    pub fn with_hasher(hasher: H, tokens: TokenConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(CredentialStore::new())),
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
        }
    }

    /// Validate, hash the password and add the user with the initial status
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        input.validate()?;

        let password_hash = self.hasher.hash(&input.password)?;
        let user = User::new(
            input.email,
            input.name,
            password_hash,
            input.is_active,
            input.roles,
        );

        let mut store = self.store.write().await;
        let record = store.add_user(user)?;
        info!(user_id = %record.key(), "Created user");
        Ok(record.into())
    }

    /// Hash and bulk insert a set of users.
    ///
    /// Returns the number inserted; users whose id is already present are skipped.
    pub async fn seed(&self, users: Vec<CreateUser>) -> UserResult<usize> {
        let mut prepared = Vec::with_capacity(users.len());
        for input in users {
            let password_hash = self.hasher.hash(&input.password)?;
            prepared.push(User::new(
                input.email,
                input.name,
                password_hash,
                input.is_active,
                input.roles,
            ));
        }

        let mut store = self.store.write().await;
        let mut inserted = 0;
        for user in prepared {
            let id = user.id.clone();
            match store.add_user(user) {
                Ok(_) => inserted += 1,
                Err(e) => warn!(user_id = %id, error = %e, "Skipping seed user"),
            }
        }
        info!(count = inserted, "Seeded user directory");
        Ok(inserted)
    }

    pub async fn get_user(&self, id: &str) -> UserResult<UserResponse> {
        let store = self.store.read().await;
        Ok(store.find_user(&user_id(id))?.into())
    }

    /// List users in ascending order (default), descending order, or
    /// filtered by status in ascending order
    pub async fn list_users(&self, query: ListQuery) -> UserResult<Vec<UserResponse>> {
        let store = self.store.read().await;
        let records = match (query.status, query.order) {
            (Some(status), _) => store.list_by_status(status),
            (None, SortOrder::Asc) => store.list_ascending()?,
            (None, SortOrder::Desc) => store.list_descending()?,
        };
        Ok(records.into_iter().map(UserResponse::from).collect())
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        input.validate()?;

        let id = user_id(id);
        let mut store = self.store.write().await;
        let record = store.update_user(&id, input)?;
        info!(user_id = %id, "Updated user");
        Ok(record.into())
    }

    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        let id = user_id(id);
        let mut store = self.store.write().await;
        store.remove_user(&id)?;
        info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Move a user to `status`. No transition rules are enforced.
    pub async fn transition_status(&self, id: &str, status: Status) -> UserResult<UserResponse> {
        let id = user_id(id);
        let mut store = self.store.write().await;
        let record = store.set_status(&id, status)?;
        info!(user_id = %id, status = %status, "Transitioned user status");
        Ok(record.into())
    }

    /// Check credentials and mint a bearer token.
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    pub async fn authenticate(&self, input: LoginRequest) -> UserResult<AuthToken> {
        let id = user_id(&input.email);
        let user = {
            let store = self.store.read().await;
            match store.find_user(&id) {
                Ok(record) => record.value().clone(),
                Err(UserError::NotFound(_)) => {
                    warn!(user_id = %id, "Authentication failed: unknown user");
                    return Err(UserError::InvalidCredentials);
                }
                Err(e) => return Err(e),
            }
        };

        if !self.hasher.verify(&input.pw, &user.password_hash)? {
            warn!(user_id = %id, "Authentication failed: password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %id, "Authentication failed: account inactive");
            return Err(UserError::Unauthorized("Account is inactive".to_string()));
        }

        let claims = TokenClaims {
            id: user.email.clone(),
            name: user.name.full(),
            roles: user.role_names(),
            is_active: user.is_active,
            iss: self.tokens.issuer.clone(),
            exp: token::now_millis() + self.tokens.lifetime().num_milliseconds(),
        };
        let token = token::issue(&TokenHeader::default(), &claims, &self.tokens.secret)?;

        info!(user_id = %id, "Authentication successful");
        Ok(AuthToken { token })
    }

    /// Verify a bearer token (signature, then expiry) and return its claims
    pub fn authorize(&self, bearer: &str) -> UserResult<TokenClaims> {
        token::authorize(bearer, &self.tokens.secret, token::now_millis()).map_err(UserError::from)
    }
}
