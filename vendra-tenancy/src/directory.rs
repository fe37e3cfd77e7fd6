//! Tenant Directory
//!
//! The central registry mapping domains to tenants. Domain uniqueness is
//! enforced here, inside the same atomic unit that creates the tenant row,
//! so two concurrent signups can never both claim a domain.

use crate::error::TenantError;
use crate::tenant::{DomainRecord, Tenant};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use vendra_core::RequestDescriptor;

/// Central tenant/domain store.
///
/// Implement this against the central database. Domains are matched exactly,
/// case-sensitive, as stored — no normalization happens at lookup time.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// True iff no existing domain record equals the given string
    async fn is_domain_unique(&self, domain: &str) -> Result<bool, TenantError>;

    /// Resolve a domain to its owning tenant id
    async fn resolve_tenant(&self, domain: &str) -> Result<Option<Uuid>, TenantError>;

    /// Register a domain for an existing tenant
    async fn register_domain(
        &self,
        domain: &str,
        tenant_id: Uuid,
    ) -> Result<DomainRecord, TenantError>;

    /// Create a tenant and its domain in one atomic unit.
    ///
    /// On [`TenantError::DuplicateDomain`] the tenant row must not persist.
    async fn create_tenant_with_domain(
        &self,
        tenant: &Tenant,
        domain: &str,
    ) -> Result<DomainRecord, TenantError>;

    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>, TenantError>;

    async fn update_tenant(&self, tenant: &Tenant) -> Result<(), TenantError>;

    async fn delete_tenant(&self, id: Uuid) -> Result<(), TenantError>;

    async fn delete_domain(&self, domain: &str) -> Result<(), TenantError>;

    /// All domains bound to a tenant
    async fn domains_for_tenant(&self, id: Uuid) -> Result<Vec<String>, TenantError>;

    async fn tenant_count(&self) -> Result<u64, TenantError>;

    async fn domain_count(&self) -> Result<u64, TenantError>;
}

/// In-memory directory for tests and single-node deployments
#[derive(Debug, Default)]
pub struct InMemoryTenantDirectory {
    // One lock over both tables keeps tenant+domain creation atomic
    inner: RwLock<DirectoryTables>,
}

#[derive(Debug, Default)]
struct DirectoryTables {
    tenants: HashMap<Uuid, Tenant>,
    domains: HashMap<String, DomainRecord>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn is_domain_unique(&self, domain: &str) -> Result<bool, TenantError> {
        Ok(!self.inner.read().domains.contains_key(domain))
    }

    async fn resolve_tenant(&self, domain: &str) -> Result<Option<Uuid>, TenantError> {
        Ok(self
            .inner
            .read()
            .domains
            .get(domain)
            .map(|record| record.tenant_id))
    }

    async fn register_domain(
        &self,
        domain: &str,
        tenant_id: Uuid,
    ) -> Result<DomainRecord, TenantError> {
        let mut tables = self.inner.write();
        if tables.domains.contains_key(domain) {
            return Err(TenantError::DuplicateDomain(domain.to_string()));
        }
        let record = DomainRecord::new(domain, tenant_id);
        tables.domains.insert(domain.to_string(), record.clone());
        debug!(domain, %tenant_id, "Domain registered");
        Ok(record)
    }

    async fn create_tenant_with_domain(
        &self,
        tenant: &Tenant,
        domain: &str,
    ) -> Result<DomainRecord, TenantError> {
        let mut tables = self.inner.write();
        if tables.domains.contains_key(domain) {
            // Uniqueness fails before the tenant row is written
            return Err(TenantError::DuplicateDomain(domain.to_string()));
        }
        let record = DomainRecord::new(domain, tenant.id);
        tables.tenants.insert(tenant.id, tenant.clone());
        tables.domains.insert(domain.to_string(), record.clone());
        debug!(tenant_id = %tenant.id, domain, "Tenant and domain created");
        Ok(record)
    }

    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>, TenantError> {
        Ok(self.inner.read().tenants.get(&id).cloned())
    }

    async fn update_tenant(&self, tenant: &Tenant) -> Result<(), TenantError> {
        let mut tables = self.inner.write();
        if !tables.tenants.contains_key(&tenant.id) {
            return Err(TenantError::NotFound(tenant.id.to_string()));
        }
        tables.tenants.insert(tenant.id, tenant.clone());
        Ok(())
    }

    async fn delete_tenant(&self, id: Uuid) -> Result<(), TenantError> {
        self.inner.write().tenants.remove(&id);
        Ok(())
    }

    async fn delete_domain(&self, domain: &str) -> Result<(), TenantError> {
        self.inner.write().domains.remove(domain);
        Ok(())
    }

    async fn domains_for_tenant(&self, id: Uuid) -> Result<Vec<String>, TenantError> {
        Ok(self
            .inner
            .read()
            .domains
            .values()
            .filter(|record| record.tenant_id == id)
            .map(|record| record.domain.clone())
            .collect())
    }

    async fn tenant_count(&self) -> Result<u64, TenantError> {
        Ok(self.inner.read().tenants.len() as u64)
    }

    async fn domain_count(&self) -> Result<u64, TenantError> {
        Ok(self.inner.read().domains.len() as u64)
    }
}

/// Resolves the tenant an inbound request belongs to from its Host header,
/// looked up verbatim against the directory.
pub struct DomainTenantResolver {
    directory: Arc<dyn TenantDirectory>,
}

impl DomainTenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the request's host to an active tenant.
    ///
    /// Only `Active` tenants may serve traffic; anything else is rejected
    /// with [`TenantError::NotActive`].
    pub async fn resolve(&self, request: &RequestDescriptor) -> Result<Tenant, TenantError> {
        let host = request
            .host()
            .ok_or_else(|| TenantError::NotFound("request has no Host header".to_string()))?;

        let tenant_id = self
            .directory
            .resolve_tenant(host)
            .await?
            .ok_or_else(|| TenantError::NotFound(host.to_string()))?;

        let tenant = self
            .directory
            .get_tenant(tenant_id)
            .await?
            .ok_or_else(|| TenantError::NotFound(tenant_id.to_string()))?;

        if !tenant.is_active() {
            return Err(TenantError::NotActive(tenant.status));
        }

        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::TenantStatus;

    #[tokio::test]
    async fn domain_uniqueness() {
        let directory = InMemoryTenantDirectory::new();
        let t1 = Tenant::new("Store One", "");
        let t2 = Tenant::new("Store Two", "");

        directory
            .register_domain("store1.example.com", t1.id)
            .await
            .unwrap();

        let result = directory
            .register_domain("store1.example.com", t2.id)
            .await;
        assert!(matches!(result, Err(TenantError::DuplicateDomain(_))));

        // Registry unchanged: still resolves to the first tenant
        assert_eq!(
            directory
                .resolve_tenant("store1.example.com")
                .await
                .unwrap(),
            Some(t1.id)
        );
        assert_eq!(directory.domain_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn domains_are_case_sensitive_as_stored() {
        let directory = InMemoryTenantDirectory::new();
        let tenant = Tenant::new("Store", "");
        directory
            .register_domain("Store1.Example.com", tenant.id)
            .await
            .unwrap();

        assert!(directory.is_domain_unique("store1.example.com").await.unwrap());
        assert!(!directory.is_domain_unique("Store1.Example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_domain_leaves_no_tenant_row() {
        let directory = InMemoryTenantDirectory::new();
        let first = Tenant::new("First", "");
        directory
            .create_tenant_with_domain(&first, "shop.example.com")
            .await
            .unwrap();

        let second = Tenant::new("Second", "");
        let result = directory
            .create_tenant_with_domain(&second, "shop.example.com")
            .await;
        assert!(matches!(result, Err(TenantError::DuplicateDomain(_))));

        assert!(directory.get_tenant(second.id).await.unwrap().is_none());
        assert_eq!(directory.tenant_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn resolver_requires_active_tenant() {
        let directory = Arc::new(InMemoryTenantDirectory::new());
        let mut tenant = Tenant::new("Store", "");
        directory
            .create_tenant_with_domain(&tenant, "store.example.com")
            .await
            .unwrap();

        let resolver = DomainTenantResolver::new(directory.clone());
        let request =
            RequestDescriptor::new("GET", "/api/v1/orders").with_header("Host", "store.example.com");

        // Pending tenants do not serve traffic
        let result = resolver.resolve(&request).await;
        assert!(matches!(result, Err(TenantError::NotActive(TenantStatus::Pending))));

        tenant.status = TenantStatus::Active;
        directory.update_tenant(&tenant).await.unwrap();
        let resolved = resolver.resolve(&request).await.unwrap();
        assert_eq!(resolved.id, tenant.id);
    }

    #[tokio::test]
    async fn resolver_misses_unknown_host() {
        let directory = Arc::new(InMemoryTenantDirectory::new());
        let resolver = DomainTenantResolver::new(directory);
        let request =
            RequestDescriptor::new("GET", "/api/v1/orders").with_header("Host", "nobody.example.com");
        assert!(matches!(
            resolver.resolve(&request).await,
            Err(TenantError::NotFound(_))
        ));
    }
}
