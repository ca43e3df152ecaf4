//! Value types of the ACL data model.
//!
//! Canonical string forms:
//! - Sid: `Principal::"alice"` or `Authority::"ROLE_ADMIN"`
//! - ObjectIdentity: `Document::42` (numeric id) or `Folder::"reports"` (textual id)
//! - Permission: a 32 glyph pattern, lowest bit first, e.g. `.*...` for read

mod ace;
mod change_type;
mod identifier;
mod object_identity;
mod permission;
mod sid;

pub use ace::{Ace, NewAce};
pub use change_type::ChangeType;
pub use identifier::Identifier;
pub use object_identity::ObjectIdentity;
pub use permission::Permission;
pub use sid::{Sid, SidKind};
