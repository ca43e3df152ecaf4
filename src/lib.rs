// src/lib.rs
pub use acl::{Acl, AclBuilder, SharedAcl};
pub use audit::{AuditLogger, AuditRecord, NoOpAuditLogger, TracingAuditLogger};
pub use authorization::{
    AclAuthorizationStrategy, AuthorizationConfig, DefaultAclAuthorizationStrategy,
};
pub use cache::{AclCache, InMemoryAclCache};
pub use error::AclError;
pub use granting::{DefaultPermissionGrantingStrategy, PermissionGrantingStrategy};
pub use retrieval::{
    Authentication, DefaultObjectIdentityGenerator, DefaultSidRetrievalStrategy,
    DomainObjectRetrievalStrategy, ObjectIdentityGenerator, ObjectIdentityRetrievalStrategy,
    SidRetrievalStrategy,
};
pub use service::{AclService, InMemoryAclService, MutableAclService};
pub use traits::DomainObject;
pub use types::{Ace, ChangeType, Identifier, NewAce, ObjectIdentity, Permission, Sid, SidKind};

mod acl;
mod audit;
mod authorization;
mod cache;
mod error;
mod granting;
mod retrieval;
mod service;
mod traits;
pub mod types;

#[cfg(test)]
mod test_support;
