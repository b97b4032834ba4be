//! # Warden Core
//!
//! Foundational types shared by every Warden crate:
//!
//! - [`errors`]: the [`AuthError`] sentinel taxonomy and the [`StoreError`] persistence errors
//! - [`password`]: bcrypt hashing and comparison
//! - [`validation`]: [`FieldRules`], the compiled identifier/email rules held on application state
//!
//! # Example
//!
//! ```ignore
//! use warden_core::{FieldRules, hash_password, verify_password};
//!
//! let rules = FieldRules::default();
//! let email = rules.validate_email("Alice@Example.com")?;
//! assert_eq!(email, "alice@example.com");
//!
//! let hash = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &hash));
//! ```

pub mod errors;
pub mod password;
pub mod validation;

pub use errors::{AuthError, StoreError};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use validation::{FieldRules, MAX_FIELD_LEN};
