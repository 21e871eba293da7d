//! The user that owns every record.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Identity as established by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
