//! Tenant model
//!
//! A tenant is a merchant account owning one isolated database whose name is
//! derived deterministically from the tenant id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    /// Being provisioned; not externally observable as a stable tenant
    #[default]
    Pending,
    /// Operational
    Active,
    /// Voluntarily disabled
    Inactive,
    /// Administratively suspended
    Suspended,
}

impl TenantStatus {
    /// Whether moving to `to` is a legal transition
    pub fn can_transition(&self, to: TenantStatus) -> bool {
        use TenantStatus::*;
        matches!(
            (self, to),
            (Pending, Active)
                | (Active, Suspended)
                | (Active, Inactive)
                | (Suspended, Active)
                | (Inactive, Active)
        )
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

/// A merchant tenant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    /// Stable opaque identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Lifecycle status
    pub status: TenantStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new tenant in `Pending` status with a fresh id
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            status: TenantStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// The name of this tenant's isolated database, derived from the id.
    ///
    /// # Examples
    ///
    /// ```
    /// use vendra_tenancy::Tenant;
    ///
    /// let tenant = Tenant::new("Acme", "demo store");
    /// assert!(tenant.database_name().starts_with("tenant_"));
    /// ```
    pub fn database_name(&self) -> String {
        format!("tenant_{}", self.id.simple())
    }

    /// Cache namespace prefix for this tenant
    pub fn cache_prefix(&self) -> String {
        format!("tenant:{}:", self.id)
    }

    /// Whether the tenant can serve requests
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

/// A hostname bound to exactly one tenant.
///
/// Created atomically alongside its tenant, never mutated, deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainRecord {
    pub domain: String,
    pub tenant_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl DomainRecord {
    pub fn new(domain: impl Into<String>, tenant_id: Uuid) -> Self {
        Self {
            domain: domain.into(),
            tenant_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_starts_pending() {
        let tenant = Tenant::new("Acme", "demo store");
        assert_eq!(tenant.status, TenantStatus::Pending);
        assert!(!tenant.is_active());
    }

    #[test]
    fn database_name_is_deterministic() {
        let tenant = Tenant::new("Acme", "");
        assert_eq!(tenant.database_name(), tenant.database_name());
        assert_eq!(
            tenant.database_name(),
            format!("tenant_{}", tenant.id.simple())
        );
    }

    #[test]
    fn status_transitions() {
        use TenantStatus::*;
        assert!(Pending.can_transition(Active));
        assert!(Active.can_transition(Suspended));
        assert!(Suspended.can_transition(Active));
        assert!(Active.can_transition(Inactive));
        assert!(Inactive.can_transition(Active));

        assert!(!Pending.can_transition(Suspended));
        assert!(!Suspended.can_transition(Inactive));
        assert!(!Active.can_transition(Pending));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TenantStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }
}
