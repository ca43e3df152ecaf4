//! Security identities.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumDiscriminants, EnumString};
use utoipa::ToSchema;

use crate::error::AclError;

use super::identifier::split_qualified;

/// A security identity: a principal (user) or a granted authority (role/group).
///
/// Equality is kind-sensitive, `Principal("admin")` never equals `Authority("admin")`.
/// Use [`Sid::principal`] and [`Sid::authority`] to get name validation.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(SidKind), derive(EnumString, StrumDisplay, AsRefStr, Hash))]
pub enum Sid {
    Principal(String),
    Authority(String),
}

impl Sid {
    pub fn principal<S: Into<String>>(name: S) -> Result<Self, AclError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AclError::InvalidArgument(
                "cannot create a principal sid from an empty name".to_string(),
            ));
        }
        Ok(Sid::Principal(name))
    }

    pub fn authority<S: Into<String>>(name: S) -> Result<Self, AclError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AclError::InvalidArgument(
                "cannot create an authority sid from an empty name".to_string(),
            ));
        }
        Ok(Sid::Authority(name))
    }

    pub fn name(&self) -> &str {
        match self {
            Sid::Principal(name) | Sid::Authority(name) => name,
        }
    }

    pub fn kind(&self) -> SidKind {
        SidKind::from(self)
    }

    pub fn is_principal(&self) -> bool {
        matches!(self, Sid::Principal(_))
    }

    pub fn is_authority(&self) -> bool {
        matches!(self, Sid::Authority(_))
    }
}

impl Display for Sid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, r#"{}::"{}""#, self.kind(), self.name())
    }
}

/// Wire shape of a [`Sid`], validated through the constructors on the way in.
#[derive(Deserialize)]
enum SidRecord {
    Principal(String),
    Authority(String),
}

impl TryFrom<SidRecord> for Sid {
    type Error = AclError;

    fn try_from(record: SidRecord) -> Result<Self, Self::Error> {
        match record {
            SidRecord::Principal(name) => Sid::principal(name),
            SidRecord::Authority(name) => Sid::authority(name),
        }
    }
}

impl<'de> Deserialize<'de> for Sid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Sid::try_from(SidRecord::deserialize(deserializer)?).map_err(DeError::custom)
    }
}

impl FromStr for Sid {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_qualified(s)?;
        let kind = SidKind::from_str(&parts.kind).map_err(|_| {
            AclError::InvalidFormat(format!(
                "Failed to parse sid: unknown kind '{}' in '{s}' (expected Principal::\"name\" or Authority::\"name\")",
                parts.kind
            ))
        })?;

        match kind {
            SidKind::Principal => Sid::principal(parts.value),
            SidKind::Authority => Sid::authority(parts.value),
        }
    }
}
