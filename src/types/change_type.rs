//! Classes of administrative change to an ACL.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The class of mutation being authorized. Each class maps to one required
/// authority in [`DefaultAclAuthorizationStrategy`](crate::DefaultAclAuthorizationStrategy).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeType {
    /// Entries, parent and inheritance flag.
    General,
    Ownership,
    /// Audit flags on entries.
    Auditing,
}

impl ChangeType {
    /// Whether the ACL owner may perform this change without further checks.
    pub fn is_owner_permitted(self) -> bool {
        matches!(self, ChangeType::General | ChangeType::Ownership)
    }
}
