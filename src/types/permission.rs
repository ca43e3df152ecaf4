//! Permission bitmasks.
//!
//! Every bit of a [`Permission`] is an independent right. The bit layout of the
//! built-in permissions is persisted alongside ACL entries and must never change.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AclError;

const PATTERN_WIDTH: u32 = u32::BITS;

/// A 32-bit permission mask, possibly combining several rights.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash,
)]
#[serde(transparent)]
pub struct Permission(u32);

impl Permission {
    pub const NONE: Permission = Permission(0);
    // Bit 0 is unassigned; stored masks start at bit 1.
    pub const READ: Permission = Permission(1 << 1);
    pub const WRITE: Permission = Permission(1 << 2);
    pub const CREATE: Permission = Permission(1 << 3);
    pub const DELETE: Permission = Permission(1 << 4);
    pub const ADMINISTRATION: Permission = Permission(1 << 5);

    /// Wrap a raw mask.
    pub const fn from_mask(mask: u32) -> Self {
        Permission(mask)
    }

    /// A permission with only the given bit set.
    pub fn from_bit(bit: u32) -> Result<Self, AclError> {
        if bit >= PATTERN_WIDTH {
            return Err(AclError::InvalidArgument(format!(
                "permission bit {bit} is outside 0..{PATTERN_WIDTH}"
            )));
        }
        Ok(Permission(1 << bit))
    }

    pub const fn mask(self) -> u32 {
        self.0
    }

    /// True iff the two masks share at least one bit.
    pub const fn matches(self, other: Permission) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn has_bit(self, bit: u32) -> bool {
        bit < PATTERN_WIDTH && self.0 & (1 << bit) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn set(self, other: Permission) -> Self {
        Permission(self.0 | other.0)
    }

    #[must_use]
    pub const fn clear(self, other: Permission) -> Self {
        Permission(self.0 & !other.0)
    }

    #[must_use]
    pub const fn toggle(self, other: Permission) -> Self {
        Permission(self.0 ^ other.0)
    }

    #[must_use]
    pub const fn clear_all(self) -> Self {
        Permission::NONE
    }

    /// Glyph rendering for logs, `*` for a set bit and `.` for a clear one,
    /// lowest bit first. Never compare permissions through this string.
    pub fn pattern(self) -> String {
        (0..PATTERN_WIDTH)
            .map(|bit| if self.has_bit(bit) { '*' } else { '.' })
            .collect()
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.pattern())
    }
}

impl BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        self.set(rhs)
    }
}
