//! The storage boundary: where ACLs come from and where they are saved.
//!
//! Backends implement [`AclService`] and, if they support writes,
//! [`MutableAclService`]. [`InMemoryAclService`] keeps everything in an
//! [`InMemoryAclCache`] and is meant for tests and embedders without storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::acl::{Acl, SharedAcl};
use crate::authorization::AclAuthorizationStrategy;
use crate::cache::{AclCache, InMemoryAclCache};
use crate::error::AclError;
use crate::granting::PermissionGrantingStrategy;
use crate::types::{ObjectIdentity, Sid};

/// Read access to stored ACLs.
///
/// `sids` optionally restricts what the returned ACLs must be able to answer
/// for; `None` requests fully loaded ACLs.
pub trait AclService: Send + Sync {
    /// Identities whose ACL has `parent` as its parent.
    fn find_children(&self, parent: &ObjectIdentity) -> Vec<ObjectIdentity>;

    fn read_acl_by_id(
        &self,
        identity: &ObjectIdentity,
        sids: Option<&[Sid]>,
    ) -> Result<SharedAcl, AclError>;

    /// Fails with [`AclError::NotFound`] if any identity has no ACL.
    fn read_acls_by_id(
        &self,
        identities: &[ObjectIdentity],
        sids: Option<&[Sid]>,
    ) -> Result<HashMap<ObjectIdentity, SharedAcl>, AclError>;
}

/// Creation, update and removal of stored ACLs.
pub trait MutableAclService: AclService {
    /// Create and store an empty ACL for `identity`.
    fn create_acl(&self, identity: ObjectIdentity, owner: Sid) -> Result<SharedAcl, AclError>;

    /// Store the current state of `acl`, which must already exist.
    fn update_acl(&self, acl: SharedAcl) -> Result<SharedAcl, AclError>;

    /// Remove the ACL for `identity`. With `delete_children` its descendants
    /// are removed first, deepest first; without it, existing children make
    /// the call fail with [`AclError::ChildrenExist`].
    fn delete_acl(&self, identity: &ObjectIdentity, delete_children: bool) -> Result<(), AclError>;
}

/// An [`AclService`] over an [`InMemoryAclCache`].
///
/// Every ACL it hands out is fully loaded, so the `sids` argument of the read
/// operations is accepted and ignored. Primary keys are assigned from a counter
/// starting at 1. Writes are serialized by an internal guard.
pub struct InMemoryAclService {
    cache: InMemoryAclCache,
    authorization: Arc<dyn AclAuthorizationStrategy>,
    granting: Arc<dyn PermissionGrantingStrategy>,
    next_id: AtomicI64,
    write_guard: Mutex<()>,
}

impl InMemoryAclService {
    pub fn new(
        authorization: Arc<dyn AclAuthorizationStrategy>,
        granting: Arc<dyn PermissionGrantingStrategy>,
    ) -> Self {
        InMemoryAclService {
            cache: InMemoryAclCache::new(),
            authorization,
            granting,
            next_id: AtomicI64::new(1),
            write_guard: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &InMemoryAclCache {
        &self.cache
    }

    fn lookup(&self, identity: &ObjectIdentity) -> Result<SharedAcl, AclError> {
        self.cache
            .get_from_cache_by_identity(identity)
            .ok_or_else(|| AclError::NotFound(format!("no acl stored for {identity}")))
    }

    fn remove(&self, identity: &ObjectIdentity, delete_children: bool) -> Result<(), AclError> {
        self.lookup(identity)?;

        let children = self.find_children(identity);
        if !children.is_empty() {
            if !delete_children {
                return Err(AclError::ChildrenExist(format!(
                    "acl for {identity} still has {} child acl(s)",
                    children.len()
                )));
            }
            for child in &children {
                self.remove(child, true)?;
            }
        }

        debug!(
            event = "AclService",
            phase = "Delete",
            identity = identity.to_string()
        );
        self.cache.evict_from_cache_by_identity(identity);
        Ok(())
    }
}

impl AclService for InMemoryAclService {
    fn find_children(&self, parent: &ObjectIdentity) -> Vec<ObjectIdentity> {
        self.cache
            .acls()
            .into_iter()
            .filter(|acl| {
                acl.parent()
                    .is_some_and(|candidate| candidate.object_identity() == parent)
            })
            .map(|acl| acl.object_identity().clone())
            .collect()
    }

    fn read_acl_by_id(
        &self,
        identity: &ObjectIdentity,
        _sids: Option<&[Sid]>,
    ) -> Result<SharedAcl, AclError> {
        self.lookup(identity)
    }

    fn read_acls_by_id(
        &self,
        identities: &[ObjectIdentity],
        _sids: Option<&[Sid]>,
    ) -> Result<HashMap<ObjectIdentity, SharedAcl>, AclError> {
        identities
            .iter()
            .map(|identity| Ok((identity.clone(), self.lookup(identity)?)))
            .collect()
    }
}

impl MutableAclService for InMemoryAclService {
    fn create_acl(&self, identity: ObjectIdentity, owner: Sid) -> Result<SharedAcl, AclError> {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        if self.cache.get_from_cache_by_identity(&identity).is_some() {
            return Err(AclError::AlreadyExists(format!(
                "an acl already exists for {identity}"
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            event = "AclService",
            phase = "Create",
            id,
            identity = identity.to_string(),
            owner = owner.to_string()
        );
        let acl = Arc::new(Acl::new(
            identity,
            id,
            owner,
            Arc::clone(&self.authorization),
            Arc::clone(&self.granting),
        ));
        self.cache.put_in_cache(Arc::clone(&acl));
        Ok(acl)
    }

    /// Children hold their parent weakly. When `acl` replaces a different
    /// stored instance, stored children of the old instance are moved over to
    /// `acl` before it is cached.
    fn update_acl(&self, acl: SharedAcl) -> Result<SharedAcl, AclError> {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = self.lookup(acl.object_identity())?;
        if stored.id() != acl.id() {
            return Err(AclError::InvalidArgument(format!(
                "acl for {} is stored with id {}, not {}",
                acl.object_identity(),
                stored.id(),
                acl.id()
            )));
        }

        let children: Vec<SharedAcl> = if Arc::ptr_eq(&stored, &acl) {
            Vec::new()
        } else {
            self.cache
                .acls()
                .into_iter()
                .filter(|child| child.parent().is_some_and(|p| Arc::ptr_eq(&p, &stored)))
                .collect()
        };

        debug!(
            event = "AclService",
            phase = "Update",
            identity = acl.object_identity().to_string(),
            entries = acl.entry_count(),
            relinked = children.len()
        );
        for child in &children {
            child.ensure_not_ancestor_of(&acl)?;
        }
        for child in &children {
            child.relink_parent(&acl)?;
        }
        self.cache.put_in_cache(Arc::clone(&acl));
        Ok(acl)
    }

    fn delete_acl(
        &self,
        identity: &ObjectIdentity,
        delete_children: bool,
    ) -> Result<(), AclError> {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.remove(identity, delete_children)
    }
}
