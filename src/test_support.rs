use std::sync::{Arc, Mutex};

use crate::acl::{Acl, SharedAcl};
use crate::audit::{AuditLogger, NoOpAuditLogger};
use crate::authorization::{AclAuthorizationStrategy, DefaultAclAuthorizationStrategy};
use crate::granting::{DefaultPermissionGrantingStrategy, PermissionGrantingStrategy};
use crate::types::{Ace, NewAce, ObjectIdentity, Sid};

pub(crate) fn principal(name: &str) -> Sid {
    Sid::principal(name).unwrap()
}

pub(crate) fn alice() -> Sid {
    principal("alice")
}

pub(crate) fn bob() -> Sid {
    principal("bob")
}

pub(crate) fn acl_admin() -> Sid {
    Sid::authority("ROLE_ACL_ADMIN").unwrap()
}

pub(crate) fn auditor() -> Sid {
    Sid::authority("ROLE_AUDITOR").unwrap()
}

pub(crate) fn document() -> ObjectIdentity {
    ObjectIdentity::new("Document", 42).unwrap()
}

pub(crate) fn authorization_strategy() -> Arc<dyn AclAuthorizationStrategy> {
    Arc::new(DefaultAclAuthorizationStrategy::new(
        acl_admin(),
        auditor(),
        acl_admin(),
    ))
}

pub(crate) fn granting_strategy(
    audit: Arc<dyn AuditLogger>,
) -> Arc<dyn PermissionGrantingStrategy> {
    Arc::new(DefaultPermissionGrantingStrategy::new(audit))
}

/// Audit sink that remembers every notification it receives.
#[derive(Default)]
pub(crate) struct RecordingAuditLogger {
    events: Mutex<Vec<(bool, Sid)>>,
}

impl RecordingAuditLogger {
    pub(crate) fn outcomes(&self) -> Vec<bool> {
        self.events.lock().unwrap().iter().map(|(granted, _)| *granted).collect()
    }

    pub(crate) fn granted(&self) -> Vec<Sid> {
        self.filtered(true)
    }

    pub(crate) fn denied(&self) -> Vec<Sid> {
        self.filtered(false)
    }

    fn filtered(&self, outcome: bool) -> Vec<Sid> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(granted, _)| *granted == outcome)
            .map(|(_, sid)| sid.clone())
            .collect()
    }
}

impl AuditLogger for RecordingAuditLogger {
    fn audit(&self, granted: bool, ace: &Ace) {
        self.events.lock().unwrap().push((granted, ace.sid().clone()));
    }
}

/// `Document::42` owned by alice, with the given entries and a recording audit sink.
pub(crate) fn acl_with_audit(entries: Vec<NewAce>) -> (SharedAcl, Arc<RecordingAuditLogger>) {
    let audit = Arc::new(RecordingAuditLogger::default());
    let acl = entries
        .into_iter()
        .fold(base_builder(document(), 1), |builder, entry| builder.entry(entry))
        .granting(granting_strategy(audit.clone()))
        .build()
        .unwrap();
    (Arc::new(acl), audit)
}

/// `Document::42` owned by alice, guarded by `authorization`.
pub(crate) fn acl_with_strategy(
    authorization: Arc<dyn AclAuthorizationStrategy>,
    entries: Vec<NewAce>,
) -> SharedAcl {
    let acl = entries
        .into_iter()
        .fold(base_builder(document(), 1), |builder, entry| builder.entry(entry))
        .authorization(authorization)
        .build()
        .unwrap();
    Arc::new(acl)
}

/// An empty ACL for `identity`, owned by alice.
pub(crate) fn acl_for(identity: ObjectIdentity, id: i64) -> SharedAcl {
    Arc::new(base_builder(identity, id).build().unwrap())
}

fn base_builder(identity: ObjectIdentity, id: i64) -> crate::acl::AclBuilder {
    Acl::builder()
        .id(id)
        .object_identity(identity)
        .owner(alice())
        .authorization(authorization_strategy())
        .granting(granting_strategy(Arc::new(NoOpAuditLogger)))
}
