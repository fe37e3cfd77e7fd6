//! Tenant Context
//!
//! Scoped switching of all tenant-bound resource handles (database, cache
//! namespace) to one tenant for the duration of a unit of work. The switch
//! is guard-based: the prior central context is restored on every exit path,
//! including errors.
//!
//! A manager is a *per-unit-of-work* object. Each request or background job
//! constructs its own manager and passes it down; there is no process-wide
//! "current tenant", so concurrent units of work for different tenants
//! cannot observe or corrupt each other's handles.
//!
//! ```rust,ignore
//! let contexts = TenantContextManager::new(provider, cache);
//! let orders = contexts
//!     .run_in_tenant_context(&tenant, |active| async move {
//!         active.database().execute("SELECT ...").await?;
//!         Ok(42)
//!     })
//!     .await?;
//! ```

use crate::cache::{CacheProvider, TenantCache};
use crate::database::{DatabaseProvider, TenantDatabase};
use crate::error::TenantError;
use crate::tenant::Tenant;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Where a unit of work currently operates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    /// Operating against the central, tenant-directory database
    #[default]
    Central,
    /// Resolving a tenant's resource handles
    Switching,
    /// All tenant-scoped operations target this tenant
    TenantActive(Uuid),
    /// Tearing back down to central
    Restoring,
}

/// The resource handles of the currently active tenant, handed to the unit
/// of work. Everything here is already bound to the tenant's namespace.
pub struct ActiveTenant {
    tenant: Tenant,
    database: TenantDatabase,
    cache: TenantCache,
}

impl ActiveTenant {
    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    pub fn database(&self) -> &TenantDatabase {
        &self.database
    }

    pub fn cache(&self) -> &TenantCache {
        &self.cache
    }
}

// Restores the central context when dropped, so restoration happens on every
// exit path of the unit of work.
struct RestoreGuard {
    state: Arc<Mutex<ContextState>>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        *state = ContextState::Restoring;
        trace!("Restoring central context");
        *state = ContextState::Central;
    }
}

/// Per-unit-of-work tenant context manager
pub struct TenantContextManager {
    provider: Arc<dyn DatabaseProvider>,
    cache: Arc<dyn CacheProvider>,
    state: Arc<Mutex<ContextState>>,
}

impl TenantContextManager {
    pub fn new(provider: Arc<dyn DatabaseProvider>, cache: Arc<dyn CacheProvider>) -> Self {
        Self {
            provider,
            cache,
            state: Arc::new(Mutex::new(ContextState::Central)),
        }
    }

    /// The current context state
    pub fn state(&self) -> ContextState {
        *self.state.lock()
    }

    pub fn is_central(&self) -> bool {
        self.state() == ContextState::Central
    }

    /// Run a unit of work inside a tenant's context.
    ///
    /// Resolves the tenant's database handle and cache namespace, executes
    /// `work` against them, and restores the central context afterwards —
    /// also when `work` fails, whose error then propagates unchanged.
    ///
    /// Calling this while a context is already held fails with
    /// [`TenantError::NestedContext`] and leaves the held context intact;
    /// nesting would make it ambiguous which tenant a deeply nested
    /// operation targets.
    pub async fn run_in_tenant_context<T, F, Fut>(
        &self,
        tenant: &Tenant,
        work: F,
    ) -> Result<T, TenantError>
    where
        F: FnOnce(ActiveTenant) -> Fut,
        Fut: Future<Output = Result<T, TenantError>>,
    {
        {
            let mut state = self.state.lock();
            match *state {
                ContextState::Central => *state = ContextState::Switching,
                ContextState::TenantActive(active) => {
                    return Err(TenantError::NestedContext {
                        active: active.to_string(),
                        requested: tenant.id.to_string(),
                    });
                }
                ContextState::Switching | ContextState::Restoring => {
                    return Err(TenantError::NestedContext {
                        active: "context in transition".to_string(),
                        requested: tenant.id.to_string(),
                    });
                }
            }
        }

        // From here on the guard restores central on every exit path
        let _guard = RestoreGuard {
            state: Arc::clone(&self.state),
        };

        let database_name = tenant.database_name();
        if !self.provider.database_exists(&database_name).await? {
            return Err(TenantError::Storage(format!(
                "database {database_name} does not exist"
            )));
        }

        let active = ActiveTenant {
            tenant: tenant.clone(),
            database: TenantDatabase::new(tenant, Arc::clone(&self.provider)),
            cache: TenantCache::new(tenant, Arc::clone(&self.cache)),
        };

        *self.state.lock() = ContextState::TenantActive(tenant.id);
        debug!(tenant_id = %tenant.id, database = %database_name, "Tenant context active");

        work(active).await
    }
}
