//! Tenant-Aware Caching
//!
//! Cache keys are namespaced per tenant (`tenant:{id}:`), so two tenants can
//! never observe each other's entries. Deprovisioning purges the whole
//! namespace.

use crate::error::TenantError;
use crate::tenant::Tenant;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache backend trait.
///
/// Implement this with your cache of choice (Redis, Memcached, ...).
#[async_trait]
pub trait CacheProvider: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TenantError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), TenantError>;

    async fn delete(&self, key: &str) -> Result<(), TenantError>;

    /// Delete every key under a prefix (namespace purge)
    async fn delete_prefix(&self, prefix: &str) -> Result<(), TenantError>;
}

/// One tenant's cache namespace.
///
/// Every key is prefixed with the tenant's namespace before it reaches the
/// backend.
#[derive(Clone)]
pub struct TenantCache {
    prefix: String,
    provider: Arc<dyn CacheProvider>,
}

impl TenantCache {
    pub fn new(tenant: &Tenant, provider: Arc<dyn CacheProvider>) -> Self {
        Self {
            prefix: tenant.cache_prefix(),
            provider,
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TenantError> {
        self.provider.get(&self.namespaced(key)).await
    }

    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), TenantError> {
        self.provider.set(&self.namespaced(key), value).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), TenantError> {
        self.provider.delete(&self.namespaced(key)).await
    }

    /// Purge this tenant's entire namespace
    pub async fn purge(&self) -> Result<(), TenantError> {
        self.provider.delete_prefix(&self.prefix).await
    }
}

/// In-memory cache for tests and single-node deployments
#[derive(Debug, Default)]
pub struct InMemoryCacheProvider {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryCacheProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheProvider for InMemoryCacheProvider {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TenantError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), TenantError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), TenantError> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), TenantError> {
        self.entries.write().retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
