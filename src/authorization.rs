//! The gate protecting administrative changes to an ACL.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acl::Acl;
use crate::error::AclError;
use crate::types::{ChangeType, Permission, Sid};

/// Decides whether a caller may apply a class of change to an ACL.
pub trait AclAuthorizationStrategy: Send + Sync {
    /// `caller` is the caller's identities, principal first.
    fn security_check(&self, caller: &[Sid], acl: &Acl, change: ChangeType) -> Result<(), AclError>;
}

/// Names of the authorities required per change class.
///
/// ```json
/// { "general": "ROLE_ACL_ADMIN", "auditing": "ROLE_AUDITOR", "ownership": "ROLE_ACL_ADMIN" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationConfig {
    #[serde(default)]
    pub general: Option<String>,
    #[serde(default)]
    pub auditing: Option<String>,
    #[serde(default)]
    pub ownership: Option<String>,
}

impl AuthorizationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AclError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Allows a change if, in order:
///
/// 1. the caller's principal owns the ACL and the change is general or ownership,
/// 2. the caller holds the authority configured for the change class,
/// 3. the ACL grants the caller [`Permission::ADMINISTRATION`].
///
/// A change class with no configured authority that gets past step 1 is a
/// [`AclError::Configuration`] error.
#[derive(Debug, Clone, Default)]
pub struct DefaultAclAuthorizationStrategy {
    required: HashMap<ChangeType, Sid>,
}

impl DefaultAclAuthorizationStrategy {
    /// Configure all three change classes.
    pub fn new(general: Sid, auditing: Sid, ownership: Sid) -> Self {
        DefaultAclAuthorizationStrategy::default()
            .with_required_authority(ChangeType::General, general)
            .with_required_authority(ChangeType::Auditing, auditing)
            .with_required_authority(ChangeType::Ownership, ownership)
    }

    /// A single authority for every change class.
    pub fn single(authority: Sid) -> Self {
        DefaultAclAuthorizationStrategy::new(authority.clone(), authority.clone(), authority)
    }

    pub fn from_config(config: &AuthorizationConfig) -> Result<Self, AclError> {
        let mut strategy = DefaultAclAuthorizationStrategy::default();
        for (change, name) in [
            (ChangeType::General, &config.general),
            (ChangeType::Auditing, &config.auditing),
            (ChangeType::Ownership, &config.ownership),
        ] {
            if let Some(name) = name {
                strategy = strategy.with_required_authority(change, Sid::authority(name.as_str())?);
            }
        }
        Ok(strategy)
    }

    #[must_use]
    pub fn with_required_authority(mut self, change: ChangeType, authority: Sid) -> Self {
        self.required.insert(change, authority);
        self
    }

    pub fn required_authority(&self, change: ChangeType) -> Option<&Sid> {
        self.required.get(&change)
    }
}

impl AclAuthorizationStrategy for DefaultAclAuthorizationStrategy {
    fn security_check(
        &self,
        caller: &[Sid],
        acl: &Acl,
        change: ChangeType,
    ) -> Result<(), AclError> {
        let Some(current) = caller.first() else {
            return Err(AclError::PermissionDenied(format!(
                "an authenticated principal is required to change the acl for {}",
                acl.object_identity()
            )));
        };

        if change.is_owner_permitted() && *current == acl.owner() {
            debug!(
                event = "SecurityCheck",
                phase = "Allowed",
                reason = "owner",
                acl = acl.object_identity().to_string(),
                caller = current.to_string(),
                change = change.as_ref()
            );
            return Ok(());
        }

        let required = self.required.get(&change).ok_or_else(|| {
            AclError::Configuration(format!("no authority configured for {change} changes"))
        })?;
        if caller.contains(required) {
            debug!(
                event = "SecurityCheck",
                phase = "Allowed",
                reason = "authority",
                acl = acl.object_identity().to_string(),
                caller = current.to_string(),
                change = change.as_ref()
            );
            return Ok(());
        }

        if matches!(
            acl.is_granted(&[Permission::ADMINISTRATION], caller, false),
            Ok(true)
        ) {
            debug!(
                event = "SecurityCheck",
                phase = "Allowed",
                reason = "administration",
                acl = acl.object_identity().to_string(),
                caller = current.to_string(),
                change = change.as_ref()
            );
            return Ok(());
        }

        debug!(
            event = "SecurityCheck",
            phase = "Denied",
            acl = acl.object_identity().to_string(),
            caller = current.to_string(),
            change = change.as_ref()
        );
        Err(AclError::PermissionDenied(format!(
            "{current} does not have the acl permissions required for {change} changes on {}",
            acl.object_identity()
        )))
    }
}
