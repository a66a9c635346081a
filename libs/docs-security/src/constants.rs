//! Well-known identities.

use uuid::Uuid;

/// Subject used when the gateway runs with authentication disabled.
pub const DEFAULT_SUBJECT_ID: Uuid = Uuid::from_u128(1);

/// Home tenant of [`DEFAULT_SUBJECT_ID`].
pub const DEFAULT_TENANT_ID: Uuid = Uuid::from_u128(2);
