//! Edge adapters turning caller context into the values the engine works on:
//! authenticated callers into [`Sid`]s and domain objects into
//! [`ObjectIdentity`]s.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::AclError;
use crate::traits::DomainObject;
use crate::types::{Identifier, ObjectIdentity, Sid};

/// An authenticated caller: the principal name plus the authorities granted to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Authentication {
    pub principal: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl Authentication {
    pub fn new<S: Into<String>>(principal: S) -> Self {
        Authentication {
            principal: principal.into(),
            authorities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_authority<S: Into<String>>(mut self, authority: S) -> Self {
        self.authorities.push(authority.into());
        self
    }
}

/// Determines the [`Sid`]s that apply to an authenticated caller.
pub trait SidRetrievalStrategy: Send + Sync {
    fn get_sids(&self, authentication: &Authentication) -> Result<Vec<Sid>, AclError>;
}

/// One principal `Sid` followed by one authority `Sid` per granted authority,
/// in the order they were granted. No role hierarchy is expanded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSidRetrievalStrategy;

impl SidRetrievalStrategy for DefaultSidRetrievalStrategy {
    fn get_sids(&self, authentication: &Authentication) -> Result<Vec<Sid>, AclError> {
        let mut sids = Vec::with_capacity(authentication.authorities.len() + 1);
        sids.push(Sid::principal(authentication.principal.as_str())?);
        for authority in &authentication.authorities {
            sids.push(Sid::authority(authority.as_str())?);
        }
        Ok(sids)
    }
}

/// Builds an [`ObjectIdentity`] from a raw identifier and a type name, for
/// callers that hold a primary key but not the domain object itself.
pub trait ObjectIdentityGenerator: Send + Sync {
    fn identity_for(&self, id: Identifier, kind: &str) -> Result<ObjectIdentity, AclError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectIdentityGenerator;

impl ObjectIdentityGenerator for DefaultObjectIdentityGenerator {
    fn identity_for(&self, id: Identifier, kind: &str) -> Result<ObjectIdentity, AclError> {
        ObjectIdentity::new(kind, id)
    }
}

/// Derives the [`ObjectIdentity`] of a domain object.
///
/// Implemented for [`DomainObjectRetrievalStrategy`] and for any closure
/// `Fn(&T) -> Result<ObjectIdentity, AclError>`, so a mapping can be supplied
/// per domain type without implementing [`DomainObject`].
pub trait ObjectIdentityRetrievalStrategy<T: ?Sized> {
    fn object_identity(&self, domain_object: &T) -> Result<ObjectIdentity, AclError>;
}

/// Retrieval through the object's own [`DomainObject`] implementation.
pub struct DomainObjectRetrievalStrategy<T> {
    _marker: PhantomData<fn(&T)>,
}

impl<T> DomainObjectRetrievalStrategy<T> {
    pub fn new() -> Self {
        DomainObjectRetrievalStrategy {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DomainObjectRetrievalStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DomainObject> ObjectIdentityRetrievalStrategy<T> for DomainObjectRetrievalStrategy<T> {
    fn object_identity(&self, domain_object: &T) -> Result<ObjectIdentity, AclError> {
        domain_object.object_identity()
    }
}

impl<T: ?Sized, F> ObjectIdentityRetrievalStrategy<T> for F
where
    F: Fn(&T) -> Result<ObjectIdentity, AclError>,
{
    fn object_identity(&self, domain_object: &T) -> Result<ObjectIdentity, AclError> {
        self(domain_object)
    }
}
