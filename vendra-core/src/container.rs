// Dependency injection container

use crate::error::Error;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// The dependency injection container.
///
/// Holds the singleton collaborators concrete service implementations are
/// built from at startup (stores, caches, configuration). Platform-specific
/// service instances themselves live in the
/// [`ContractRegistry`](crate::ContractRegistry), keyed by version and
/// platform; the container is for the dependencies beneath them.
#[derive(Clone, Default)]
pub struct Container {
    providers: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self::default()
    }

    /// Register a provider instance
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) {
        trace!(provider = type_name::<T>(), "Registering provider");
        self.providers
            .write()
            .insert(TypeId::of::<T>(), Arc::new(instance));
        debug!(provider = type_name::<T>(), "Provider registered");
    }

    /// Resolve a provider by type
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        let result = self
            .providers
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|any| any.clone().downcast::<T>().ok())
            .ok_or_else(|| Error::ProviderNotFound(type_name::<T>().to_string()));

        match &result {
            Ok(_) => trace!(provider = type_name::<T>(), "Provider resolved"),
            Err(_) => debug!(provider = type_name::<T>(), "Provider not found"),
        }
        result
    }

    /// Check if a provider is registered
    pub fn has<T: Send + Sync + 'static>(&self) -> bool {
        self.providers.read().contains_key(&TypeId::of::<T>())
    }

    /// Clear all providers
    pub fn clear(&self) {
        let mut providers = self.providers.write();
        let count = providers.len();
        providers.clear();
        debug!(provider_count = count, "Cleared DI container");
    }
}
