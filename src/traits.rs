use crate::error::AclError;
use crate::types::{Identifier, ObjectIdentity};

/// A domain object that can be protected by an ACL.
///
/// This is the explicit, per-type mapping from a domain value to the
/// [`ObjectIdentity`] its ACL is stored under.
pub trait DomainObject {
    /// The type name used in the identity, e.g. `Document`.
    fn object_type() -> &'static str;

    /// The identifier of this instance. Must not be reused by another object of the same type.
    fn object_id(&self) -> Identifier;

    /// Build the identity for this instance.
    fn object_identity(&self) -> Result<ObjectIdentity, AclError> {
        ObjectIdentity::new(Self::object_type(), self.object_id())
    }
}
