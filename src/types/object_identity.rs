//! Identities of protected domain objects.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::AclError;

use super::identifier::{Identifier, split_qualified};

/// The `(type, identifier)` pair naming one protected domain object,
/// e.g. `Document::42` or `Folder::"reports"`.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq, Hash)]
pub struct ObjectIdentity {
    #[serde(rename = "type")]
    kind: String,
    identifier: Identifier,
}

impl ObjectIdentity {
    pub fn new<K, I>(kind: K, identifier: I) -> Result<Self, AclError>
    where
        K: Into<String>,
        I: Into<Identifier>,
    {
        let kind = kind.into();
        let identifier = identifier.into();
        if kind.trim().is_empty() {
            return Err(AclError::InvalidArgument(
                "object identity requires a non-empty type".to_string(),
            ));
        }
        if identifier.is_blank() {
            return Err(AclError::InvalidArgument(format!(
                "object identity of type '{kind}' requires a non-empty identifier"
            )));
        }
        Ok(ObjectIdentity { kind, identifier })
    }

    /// The domain type name, e.g. `Document`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }
}

impl Display for ObjectIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}::{}", self.kind, self.identifier.fmt_qualified())
    }
}

#[derive(Deserialize)]
struct ObjectIdentityRecord {
    #[serde(rename = "type")]
    kind: String,
    identifier: Identifier,
}

impl<'de> Deserialize<'de> for ObjectIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = ObjectIdentityRecord::deserialize(deserializer)?;
        ObjectIdentity::new(record.kind, record.identifier).map_err(DeError::custom)
    }
}

impl FromStr for ObjectIdentity {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_qualified(s)?;
        ObjectIdentity::new(parts.kind.clone(), Identifier::from_parts(&parts))
    }
}
