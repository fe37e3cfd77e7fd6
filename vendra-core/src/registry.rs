//! Contract Registry
//!
//! The binding table from (API version, abstract contract) to the concrete
//! implementations declared for each platform. Populated explicitly at
//! startup and looked up by type, never by constructing type names from
//! strings.
//!
//! Ordering is insertion order; the binder takes the first entry whose
//! platform matches. Two concretes declaring the same platform for one
//! contract is a wiring defect and is rejected here, at registration time,
//! so lookups never have to disambiguate.

use crate::error::Error;
use crate::platform::Platform;
use crate::version::ApiVersion;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One registered concrete implementation of a contract
#[derive(Clone)]
pub(crate) struct BindingEntry {
    pub(crate) platform: Platform,
    pub(crate) concrete: &'static str,
    pub(crate) instance: Arc<dyn Any + Send + Sync>,
}

/// The contract binding table.
///
/// Cheap to clone; clones share the same underlying table.
#[derive(Clone, Default)]
pub struct ContractRegistry {
    bindings: Arc<RwLock<HashMap<(ApiVersion, TypeId), Vec<BindingEntry>>>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a concrete implementation of contract `C` for a platform.
    ///
    /// `C` is the abstract contract (typically `dyn SomeService`); `concrete`
    /// names the implementation for logs and error messages.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// registry.register::<dyn AuthService>(
    ///     ApiVersion::V1,
    ///     Platform::Web,
    ///     "WebAuthService",
    ///     Arc::new(WebAuthService::new(sessions)),
    /// )?;
    /// ```
    pub fn register<C>(
        &self,
        version: ApiVersion,
        platform: Platform,
        concrete: &'static str,
        instance: Arc<C>,
    ) -> Result<(), Error>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = (version, TypeId::of::<C>());
        let mut bindings = self.bindings.write();
        let entries = bindings.entry(key).or_default();

        if entries.iter().any(|entry| entry.platform == platform) {
            return Err(Error::DuplicateBinding {
                contract: type_name::<C>().to_string(),
                platform: platform.to_string(),
            });
        }

        entries.push(BindingEntry {
            platform,
            concrete,
            instance: Arc::new(instance),
        });

        debug!(
            contract = type_name::<C>(),
            concrete,
            %version,
            %platform,
            "Contract implementation registered"
        );
        Ok(())
    }

    /// The candidate implementations for a contract under a version, in
    /// insertion order: (concrete name, declared platform).
    ///
    /// Unknown (version, contract) pairs yield an empty list; absence is the
    /// binder's concern, not the registry's.
    pub fn implementations_for<C>(&self, version: ApiVersion) -> Vec<(&'static str, Platform)>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.bindings
            .read()
            .get(&(version, TypeId::of::<C>()))
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| (entry.concrete, entry.platform))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn entries_for<C>(&self, version: ApiVersion) -> Vec<BindingEntry>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.bindings
            .read()
            .get(&(version, TypeId::of::<C>()))
            .cloned()
            .unwrap_or_default()
    }
}
