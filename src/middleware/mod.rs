//! Middleware modules for request processing.
//!
//! Cross-cutting authentication and authorization:
//!
//! - [`auth`]: the `AuthUser` extractor turning a bearer token into typed
//!   claims
//! - [`role`]: per-collection role whitelists and the self-or-privileged
//!   ownership policy
//!
//! # Request flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. The collection's role guard verifies the token and whitelists the
//!    caller's role
//! 3. Handlers addressing a specific record apply the ownership policy
//! 4. The handler runs only after every check passes
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::{OwnershipClaim, authorize_resource, privileged_roles};
//!
//! async fn get_credential(auth_user: AuthUser, id: Uuid) -> Result<_, AppError> {
//!     authorize_resource(
//!         auth_user.claims(),
//!         id,
//!         OwnershipClaim::Subject,
//!         privileged_roles(Role::Student),
//!     )?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod role;
