// Error types for tenancy operations

use crate::tenant::TenantStatus;

/// Tenancy errors.
///
/// Provisioning failures deliberately carry no internal detail: which phase
/// failed and why is captured in operator logs, while callers see a single
/// opaque failure. Raw storage-engine text never crosses this boundary
/// toward clients.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("tenant not found: {0}")]
    NotFound(String),

    #[error("domain already registered: {0}")]
    DuplicateDomain(String),

    #[error("tenant is not active (status: {0})")]
    NotActive(TenantStatus),

    #[error("tenant context already held for {active} while switching to {requested}")]
    NestedContext { active: String, requested: String },

    #[error("tenant provisioning failed")]
    ProvisioningFailed,

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: TenantStatus, to: TenantStatus },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("seeding error: {0}")]
    Seeding(String),

    #[error("cache error: {0}")]
    Cache(String),
}
