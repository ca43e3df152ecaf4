//! Dual-keyed cache of shared ACLs.
//!
//! Entries are indexed both by primary key and by object identity. The two
//! indexes live behind one lock, so readers always see them in step. There is
//! no capacity bound or expiry: an ACL stays cached until it is evicted or the
//! cache is cleared.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::acl::SharedAcl;
use crate::types::{Identifier, ObjectIdentity};

/// Cache of mutable ACL instances, usually sitting in front of an
/// [`AclService`](crate::AclService) backend.
pub trait AclCache: Send + Sync {
    fn evict_from_cache_by_id(&self, id: &Identifier);

    fn evict_from_cache_by_identity(&self, identity: &ObjectIdentity);

    fn get_from_cache_by_id(&self, id: &Identifier) -> Option<SharedAcl>;

    fn get_from_cache_by_identity(&self, identity: &ObjectIdentity) -> Option<SharedAcl>;

    /// Cache `acl` under both its primary key and its object identity.
    fn put_in_cache(&self, acl: SharedAcl);

    fn clear_cache(&self);
}

#[derive(Default)]
struct CacheIndex {
    by_id: HashMap<Identifier, SharedAcl>,
    by_identity: HashMap<ObjectIdentity, SharedAcl>,
}

impl CacheIndex {
    fn remove_by_id(&mut self, id: &Identifier) -> Option<SharedAcl> {
        let acl = self.by_id.remove(id)?;
        self.by_identity.remove(acl.object_identity());
        Some(acl)
    }

    fn remove_by_identity(&mut self, identity: &ObjectIdentity) -> Option<SharedAcl> {
        let acl = self.by_identity.remove(identity)?;
        self.by_id.remove(acl.id());
        Some(acl)
    }
}

/// [`AclCache`] over two hash maps guarded by a single reader/writer lock.
#[derive(Default)]
pub struct InMemoryAclCache {
    index: RwLock<CacheIndex>,
}

impl InMemoryAclCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_index(&self) -> RwLockReadGuard<'_, CacheIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, CacheIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read_index().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every cached ACL, in no particular order.
    pub fn acls(&self) -> Vec<SharedAcl> {
        self.read_index().by_id.values().cloned().collect()
    }
}

impl AclCache for InMemoryAclCache {
    fn evict_from_cache_by_id(&self, id: &Identifier) {
        if let Some(acl) = self.write_index().remove_by_id(id) {
            debug!(
                event = "Cache",
                phase = "Evict",
                id = id.to_string(),
                identity = acl.object_identity().to_string()
            );
        }
    }

    fn evict_from_cache_by_identity(&self, identity: &ObjectIdentity) {
        if let Some(acl) = self.write_index().remove_by_identity(identity) {
            debug!(
                event = "Cache",
                phase = "Evict",
                id = acl.id().to_string(),
                identity = identity.to_string()
            );
        }
    }

    fn get_from_cache_by_id(&self, id: &Identifier) -> Option<SharedAcl> {
        let found = self.read_index().by_id.get(id).cloned();
        trace!(event = "Cache", phase = "Get", id = id.to_string(), hit = found.is_some());
        found
    }

    fn get_from_cache_by_identity(&self, identity: &ObjectIdentity) -> Option<SharedAcl> {
        let found = self.read_index().by_identity.get(identity).cloned();
        trace!(
            event = "Cache",
            phase = "Get",
            identity = identity.to_string(),
            hit = found.is_some()
        );
        found
    }

    fn put_in_cache(&self, acl: SharedAcl) {
        let mut index = self.write_index();
        // Drop whatever either key pointed at so no stale companion key survives.
        index.remove_by_id(acl.id());
        index.remove_by_identity(acl.object_identity());

        debug!(
            event = "Cache",
            phase = "Put",
            id = acl.id().to_string(),
            identity = acl.object_identity().to_string()
        );
        index.by_id.insert(acl.id().clone(), acl.clone());
        index.by_identity.insert(acl.object_identity().clone(), acl);
    }

    fn clear_cache(&self) {
        let mut index = self.write_index();
        index.by_id.clear();
        index.by_identity.clear();
        debug!(event = "Cache", phase = "Clear");
    }
}
