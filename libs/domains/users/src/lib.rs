//! Users Domain
//!
//! In-memory user directory with token-based authentication.
//!
//! # Features
//!
//! - Self-balancing ordered index with a lifecycle status per record
//! - Ascending, descending and status-filtered traversal
//! - Password hashing with Argon2
//! - SHA3-512 signed bearer tokens with expiry
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, bearer middleware
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, hashing, token issuance, locking
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Store    │  ← Credential store over the balanced index
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Index    │  ← AVL tree + LIFO stack
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, seed, service::UserService, token::TokenConfig};
//!
//! # async fn run() -> Result<(), domain_users::UserError> {
//! let service = UserService::new(TokenConfig::new("secret"));
//! service.seed(seed::development_users()).await?;
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod index;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod seed;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use index::{BalancedIndex, IndexError, OrderedStack, Record, Status};
pub use models::{
    AuthToken, CreateUser, ListQuery, LoginRequest, Role, SortOrder, UpdateUser, User,
    UserResponse,
};
pub use password::{Argon2Hasher, PasswordHasher};
pub use policy::PasswordPolicy;
pub use service::UserService;
pub use store::CredentialStore;
pub use token::{TokenClaims, TokenConfig, TokenError};
