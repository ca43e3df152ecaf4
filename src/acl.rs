use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use itertools::Itertools;
use tracing::debug;

use crate::authorization::AclAuthorizationStrategy;
use crate::error::AclError;
use crate::granting::PermissionGrantingStrategy;
use crate::types::{Ace, ChangeType, Identifier, NewAce, ObjectIdentity, Permission, Sid};

/// An ACL shared between callers, the cache and child ACLs.
pub type SharedAcl = Arc<Acl>;

/// The access control list of one domain object.
///
/// Holds the ordered entries, the owner, an optional parent used for
/// inheritance and, when only some identities were loaded, the set of
/// [`Sid`]s this instance can answer for.
///
/// All methods take `&self`; mutable state sits behind an internal lock so an
/// `Acl` can be shared through [`SharedAcl`]. Every mutator first passes the
/// [`AclAuthorizationStrategy`] gate and changes nothing when it is refused.
pub struct Acl {
    id: Identifier,
    object_identity: ObjectIdentity,
    authorization: Arc<dyn AclAuthorizationStrategy>,
    granting: Arc<dyn PermissionGrantingStrategy>,
    loaded_sids: Option<Vec<Sid>>,
    state: RwLock<AclState>,
}

#[derive(Debug)]
struct AclState {
    owner: Sid,
    parent: Option<Weak<Acl>>,
    entries_inheriting: bool,
    aces: Vec<Ace>,
}

impl Acl {
    /// Create an empty ACL that inherits from its (not yet set) parent.
    pub fn new<I: Into<Identifier>>(
        object_identity: ObjectIdentity,
        id: I,
        owner: Sid,
        authorization: Arc<dyn AclAuthorizationStrategy>,
        granting: Arc<dyn PermissionGrantingStrategy>,
    ) -> Self {
        Acl {
            id: id.into(),
            object_identity,
            authorization,
            granting,
            loaded_sids: None,
            state: RwLock::new(AclState {
                owner,
                parent: None,
                entries_inheriting: true,
                aces: Vec::new(),
            }),
        }
    }

    pub fn builder() -> AclBuilder {
        AclBuilder::new()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AclState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AclState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Primary key assigned by the persistence layer.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn object_identity(&self) -> &ObjectIdentity {
        &self.object_identity
    }

    pub fn owner(&self) -> Sid {
        self.read_state().owner.clone()
    }

    /// The parent ACL, if one is set and still alive.
    pub fn parent(&self) -> Option<SharedAcl> {
        self.read_state().parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_entries_inheriting(&self) -> bool {
        self.read_state().entries_inheriting
    }

    /// A snapshot of this ACL's own entries, in evaluation order.
    ///
    /// Entries of parent ACLs are not included. Use [`Acl::is_granted`] for
    /// authorization decisions.
    pub fn entries(&self) -> Vec<Ace> {
        self.read_state().aces.clone()
    }

    pub fn entry_count(&self) -> usize {
        self.read_state().aces.len()
    }

    /// The identities this instance was loaded for, `None` meaning all of them.
    pub fn loaded_sids(&self) -> Option<&[Sid]> {
        self.loaded_sids.as_deref()
    }

    /// Whether every requested `Sid` is represented by this instance.
    pub fn is_sid_loaded(&self, sids: &[Sid]) -> bool {
        match &self.loaded_sids {
            None => true,
            Some(loaded) => sids.iter().all(|sid| loaded.contains(sid)),
        }
    }

    /// Decide whether any of `sids` holds any of `permissions` on this object.
    ///
    /// `admin` marks administrative checks, which are never audited. Fails
    /// with [`AclError::SidUnloaded`] if a requested `Sid` is outside the loaded
    /// set and with [`AclError::NoMatchingEntry`] if neither this ACL nor any
    /// inherited ancestor has an entry for the request.
    pub fn is_granted(
        &self,
        permissions: &[Permission],
        sids: &[Sid],
        admin: bool,
    ) -> Result<bool, AclError> {
        if permissions.is_empty() {
            return Err(AclError::InvalidArgument(
                "at least one permission is required".to_string(),
            ));
        }
        if sids.is_empty() {
            return Err(AclError::InvalidArgument(
                "at least one sid is required".to_string(),
            ));
        }
        if !self.is_sid_loaded(sids) {
            return Err(AclError::SidUnloaded(format!(
                "acl for {} was not loaded for all of [{}]",
                self.object_identity,
                sids.iter().join(", ")
            )));
        }

        debug!(
            event = "IsGranted",
            phase = "Request",
            acl = self.object_identity.to_string(),
            permissions = permissions.iter().map(|p| p.mask()).join(","),
            sids = sids.iter().join(", "),
            admin
        );

        let result = self.granting.is_granted(self, permissions, sids, admin);

        debug!(
            event = "IsGranted",
            phase = "Result",
            acl = self.object_identity.to_string(),
            result = ?result
        );
        result
    }

    /// Insert a new, unaudited entry at `index`, shifting later entries down.
    pub fn insert_ace(
        &self,
        caller: &[Sid],
        index: usize,
        permission: Permission,
        sid: Sid,
        granting: bool,
    ) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::General)?;

        let mut state = self.write_state();
        if index > state.aces.len() {
            return Err(AclError::NotFound(format!(
                "insert index {index} is past the end of the entry list (size {})",
                state.aces.len()
            )));
        }

        let ace = NewAce::new(sid, permission, granting).attach(self.id.clone());
        debug!(
            event = "AclMutation",
            phase = "InsertAce",
            acl = self.object_identity.to_string(),
            index,
            ace = ace.to_string()
        );
        state.aces.insert(index, ace);
        Ok(())
    }

    /// Replace the permission of the entry at `index`.
    pub fn update_ace(
        &self,
        caller: &[Sid],
        index: usize,
        permission: Permission,
    ) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::General)?;

        let mut state = self.write_state();
        let ace = entry_at(&mut state.aces, index)?;
        ace.set_permission(permission);
        debug!(
            event = "AclMutation",
            phase = "UpdateAce",
            acl = self.object_identity.to_string(),
            index,
            ace = ace.to_string()
        );
        Ok(())
    }

    /// Remove the entry at `index`, shifting later entries up.
    pub fn delete_ace(&self, caller: &[Sid], index: usize) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::General)?;

        let mut state = self.write_state();
        entry_at(&mut state.aces, index)?;
        let removed = state.aces.remove(index);
        debug!(
            event = "AclMutation",
            phase = "DeleteAce",
            acl = self.object_identity.to_string(),
            index,
            ace = removed.to_string()
        );
        Ok(())
    }

    /// Set both audit flags of the entry at `index`.
    pub fn update_auditing(
        &self,
        caller: &[Sid],
        index: usize,
        audit_success: bool,
        audit_failure: bool,
    ) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::Auditing)?;

        let mut state = self.write_state();
        let ace = entry_at(&mut state.aces, index)?;
        ace.set_auditing(audit_success, audit_failure);
        debug!(
            event = "AclMutation",
            phase = "UpdateAuditing",
            acl = self.object_identity.to_string(),
            index,
            audit_success,
            audit_failure
        );
        Ok(())
    }

    pub fn set_owner(&self, caller: &[Sid], owner: Sid) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::Ownership)?;

        debug!(
            event = "AclMutation",
            phase = "SetOwner",
            acl = self.object_identity.to_string(),
            owner = owner.to_string()
        );
        self.write_state().owner = owner;
        Ok(())
    }

    /// Set or clear the parent used for inheritance.
    ///
    /// The parent is held weakly; it must not be this ACL or have this ACL
    /// among its ancestors.
    pub fn set_parent(&self, caller: &[Sid], parent: Option<&SharedAcl>) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::General)?;

        if let Some(parent) = parent {
            self.ensure_not_ancestor_of(parent)?;
        }

        debug!(
            event = "AclMutation",
            phase = "SetParent",
            acl = self.object_identity.to_string(),
            parent = parent.map(|p| p.object_identity().to_string())
        );
        self.write_state().parent = parent.map(Arc::downgrade);
        Ok(())
    }

    pub fn set_entries_inheriting(
        &self,
        caller: &[Sid],
        entries_inheriting: bool,
    ) -> Result<(), AclError> {
        self.authorization
            .security_check(caller, self, ChangeType::General)?;

        debug!(
            event = "AclMutation",
            phase = "SetEntriesInheriting",
            acl = self.object_identity.to_string(),
            entries_inheriting
        );
        self.write_state().entries_inheriting = entries_inheriting;
        Ok(())
    }

    /// Point this ACL at a replacement instance of its parent. Used by the
    /// service when an update swaps the stored instance; callers have already
    /// passed the gate for the parent's update.
    pub(crate) fn relink_parent(&self, parent: &SharedAcl) -> Result<(), AclError> {
        self.ensure_not_ancestor_of(parent)?;
        debug!(
            event = "AclMutation",
            phase = "RelinkParent",
            acl = self.object_identity.to_string(),
            parent = parent.object_identity().to_string()
        );
        self.write_state().parent = Some(Arc::downgrade(parent));
        Ok(())
    }

    pub(crate) fn ensure_not_ancestor_of(&self, parent: &SharedAcl) -> Result<(), AclError> {
        let mut cursor = Some(Arc::clone(parent));
        while let Some(current) = cursor {
            if std::ptr::eq(self, Arc::as_ptr(&current)) {
                return Err(AclError::InvalidArgument(format!(
                    "acl for {} cannot be its own parent or ancestor",
                    self.object_identity
                )));
            }
            cursor = current.parent();
        }
        Ok(())
    }
}

fn entry_at(aces: &mut [Ace], index: usize) -> Result<&mut Ace, AclError> {
    let size = aces.len();
    aces.get_mut(index).ok_or_else(|| {
        AclError::NotFound(format!(
            "index {index} does not refer to an entry (size {size})"
        ))
    })
}

impl Display for Acl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let state = self.read_state();
        let parent = state
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map_or_else(|| "none".to_string(), |p| p.object_identity().to_string());
        write!(
            f,
            "Acl[id: {}; identity: {}; owner: {}; entries: {}; inheriting: {}; parent: {}]",
            self.id,
            self.object_identity,
            state.owner,
            state.aces.len(),
            state.entries_inheriting,
            parent
        )
    }
}

impl Debug for Acl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Acl")
            .field("id", &self.id)
            .field("object_identity", &self.object_identity)
            .field("loaded_sids", &self.loaded_sids)
            .field("state", &*self.read_state())
            .finish_non_exhaustive()
    }
}

/// Builder for ACLs rebuilt from storage or created with non-default options.
///
/// ```ignore
/// let acl = Acl::builder()
///     .id(1)
///     .object_identity(ObjectIdentity::new("Document", 42)?)
///     .owner(Sid::principal("alice")?)
///     .authorization(authorization)
///     .granting(granting)
///     .entry(NewAce::new(Sid::principal("bob")?, Permission::READ, true))
///     .build()?;
/// ```
#[must_use]
pub struct AclBuilder {
    id: Option<Identifier>,
    object_identity: Option<ObjectIdentity>,
    owner: Option<Sid>,
    authorization: Option<Arc<dyn AclAuthorizationStrategy>>,
    granting: Option<Arc<dyn PermissionGrantingStrategy>>,
    parent: Option<Weak<Acl>>,
    entries_inheriting: bool,
    loaded_sids: Option<Vec<Sid>>,
    entries: Vec<NewAce>,
}

impl Default for AclBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AclBuilder {
    pub fn new() -> Self {
        AclBuilder {
            id: None,
            object_identity: None,
            owner: None,
            authorization: None,
            granting: None,
            parent: None,
            entries_inheriting: true,
            loaded_sids: None,
            entries: Vec::new(),
        }
    }

    pub fn id<I: Into<Identifier>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn object_identity(mut self, object_identity: ObjectIdentity) -> Self {
        self.object_identity = Some(object_identity);
        self
    }

    pub fn owner(mut self, owner: Sid) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn authorization(mut self, authorization: Arc<dyn AclAuthorizationStrategy>) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn granting(mut self, granting: Arc<dyn PermissionGrantingStrategy>) -> Self {
        self.granting = Some(granting);
        self
    }

    pub fn parent(mut self, parent: &SharedAcl) -> Self {
        self.parent = Some(Arc::downgrade(parent));
        self
    }

    pub fn entries_inheriting(mut self, entries_inheriting: bool) -> Self {
        self.entries_inheriting = entries_inheriting;
        self
    }

    /// Restrict the instance to the given identities.
    pub fn loaded_sids(mut self, sids: Vec<Sid>) -> Self {
        self.loaded_sids = Some(sids);
        self
    }

    /// Append a stored entry; entries keep the order they are added in.
    pub fn entry(mut self, entry: NewAce) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> Result<Acl, AclError> {
        let id = self
            .id
            .ok_or_else(|| AclError::InvalidArgument("acl id required".to_string()))?;
        let object_identity = self
            .object_identity
            .ok_or_else(|| AclError::InvalidArgument("object identity required".to_string()))?;
        let owner = self
            .owner
            .ok_or_else(|| AclError::InvalidArgument("owner required".to_string()))?;
        let authorization = self.authorization.ok_or_else(|| {
            AclError::InvalidArgument("authorization strategy required".to_string())
        })?;
        let granting = self.granting.ok_or_else(|| {
            AclError::InvalidArgument("permission granting strategy required".to_string())
        })?;

        let aces = self
            .entries
            .into_iter()
            .map(|entry| entry.attach(id.clone()))
            .collect();

        Ok(Acl {
            id,
            object_identity,
            authorization,
            granting,
            loaded_sids: self.loaded_sids,
            state: RwLock::new(AclState {
                owner,
                parent: self.parent,
                entries_inheriting: self.entries_inheriting,
                aces,
            }),
        })
    }
}

#[cfg(test)]
mod tests;
