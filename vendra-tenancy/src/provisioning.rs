//! Tenant Lifecycle
//!
//! Multi-phase provisioning of a new tenant: directory rows, isolated
//! database, baseline schema, seeded roles, first admin user, activation.
//! There is no transaction spanning the central database and the tenant's
//! database server, so every phase after the first compensates on failure by
//! tearing down what earlier phases built.
//!
//! Callers see two failure shapes only: [`TenantError::DuplicateDomain`]
//! when the requested domain is taken, and the deliberately opaque
//! [`TenantError::ProvisioningFailed`] for everything else. The detail goes
//! to the logs, not to the signup form.

use crate::cache::CacheProvider;
use crate::context::TenantContextManager;
use crate::database::DatabaseProvider;
use crate::directory::TenantDirectory;
use crate::error::TenantError;
use crate::migration::MigrationRunner;
use crate::seeding::{merchant_admin_structure, RoleSeeder, RoleStore, RoleStructure};
use crate::tenant::{Tenant, TenantStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// A user row inside one tenant's database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user. The password arrives already hashed; this
/// layer never sees plaintext credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// User persistence inside one tenant database
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user and attach the given role. Duplicate emails fail.
    async fn create_user(
        &self,
        database: &str,
        new_user: &NewUser,
        role: &str,
    ) -> Result<User, TenantError>;

    async fn find_by_email(&self, database: &str, email: &str)
        -> Result<Option<User>, TenantError>;

    async fn user_count(&self, database: &str) -> Result<u64, TenantError>;
}

/// Everything a signup needs to provision a tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub first_user: NewUser,
}

impl CreateTenantRequest {
    pub fn new(name: impl Into<String>, domain: impl Into<String>, first_user: NewUser) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            domain: domain.into(),
            first_user,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Orchestrates tenant provisioning, deprovisioning and status changes
pub struct TenantProvisioner {
    directory: Arc<dyn TenantDirectory>,
    provider: Arc<dyn DatabaseProvider>,
    cache: Arc<dyn CacheProvider>,
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    structure: RoleStructure,
    migrations: MigrationRunner,
    admin_role: String,
}

impl TenantProvisioner {
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        provider: Arc<dyn DatabaseProvider>,
        cache: Arc<dyn CacheProvider>,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            directory,
            provider,
            cache,
            users,
            roles,
            structure: merchant_admin_structure(),
            migrations: MigrationRunner::baseline(),
            admin_role: "merchant_admin".to_string(),
        }
    }

    pub fn with_role_structure(mut self, structure: RoleStructure) -> Self {
        self.structure = structure;
        self
    }

    pub fn with_migrations(mut self, migrations: MigrationRunner) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn with_admin_role(mut self, role: impl Into<String>) -> Self {
        self.admin_role = role.into();
        self
    }

    /// Provision a tenant end to end.
    ///
    /// Phases, in order: directory rows (tenant + domain, atomic), isolated
    /// database, baseline schema, role seeding, first admin user, activation.
    /// A failure in any phase after the first tears everything down again;
    /// the caller only learns that provisioning failed.
    pub async fn create_tenant(
        &self,
        request: &CreateTenantRequest,
    ) -> Result<(Tenant, User), TenantError> {
        let tenant = Tenant::new(&request.name, &request.description);

        // Phase 1: central rows. Duplicate domains are a caller error and
        // reported as such; nothing exists yet to clean up.
        self.directory
            .create_tenant_with_domain(&tenant, &request.domain)
            .await?;
        info!(tenant_id = %tenant.id, domain = %request.domain, "Tenant registered");

        match self.build_tenant_resources(&tenant, request).await {
            Ok(provisioned) => Ok(provisioned),
            Err(cause) => {
                error!(tenant_id = %tenant.id, %cause, "Provisioning failed, rolling back");
                self.rollback(&tenant, &request.domain).await;
                Err(TenantError::ProvisioningFailed)
            }
        }
    }

    // Phases 2..6. Any error here triggers rollback in the caller.
    async fn build_tenant_resources(
        &self,
        tenant: &Tenant,
        request: &CreateTenantRequest,
    ) -> Result<(Tenant, User), TenantError> {
        let database_name = tenant.database_name();
        self.provider.create_database(&database_name).await?;

        let contexts =
            TenantContextManager::new(Arc::clone(&self.provider), Arc::clone(&self.cache));
        let seeder = RoleSeeder::new(Arc::clone(&self.roles));
        let users = Arc::clone(&self.users);
        let first_user = request.first_user.clone();
        let admin_role = self.admin_role.clone();

        let user = contexts
            .run_in_tenant_context(tenant, |active| {
                let migrations = &self.migrations;
                let structure = &self.structure;
                let seeder = &seeder;
                async move {
                    migrations.run_all(active.database()).await?;
                    seeder.seed_roles(&active, structure).await?;
                    users
                        .create_user(active.database().name(), &first_user, &admin_role)
                        .await
                }
            })
            .await?;

        let mut activated = tenant.clone();
        activated.status = TenantStatus::Active;
        activated.updated_at = Utc::now();
        self.directory.update_tenant(&activated).await?;
        info!(tenant_id = %activated.id, database = %database_name, "Tenant active");
        Ok((activated, user))
    }

    // Best effort, in reverse provisioning order. Failures are logged and
    // skipped so one stuck resource cannot strand the rest.
    async fn rollback(&self, tenant: &Tenant, domain: &str) {
        let database_name = tenant.database_name();
        match self.provider.database_exists(&database_name).await {
            Ok(true) => {
                if let Err(cause) = self.provider.drop_database(&database_name).await {
                    warn!(database = %database_name, %cause, "Rollback could not drop database");
                }
            }
            Ok(false) => {}
            Err(cause) => {
                warn!(database = %database_name, %cause, "Rollback could not inspect database");
            }
        }
        if let Err(cause) = self.directory.delete_domain(domain).await {
            warn!(domain, %cause, "Rollback could not delete domain");
        }
        if let Err(cause) = self.directory.delete_tenant(tenant.id).await {
            warn!(tenant_id = %tenant.id, %cause, "Rollback could not delete tenant");
        }
        if let Err(cause) = self.cache.delete_prefix(&tenant.cache_prefix()).await {
            warn!(tenant_id = %tenant.id, %cause, "Rollback could not purge cache");
        }
    }

    /// Deprovision a tenant: domains, database, directory row, cache.
    pub async fn delete_tenant(&self, id: Uuid) -> Result<(), TenantError> {
        let tenant = self
            .directory
            .get_tenant(id)
            .await?
            .ok_or_else(|| TenantError::NotFound(id.to_string()))?;

        for domain in self.directory.domains_for_tenant(id).await? {
            self.directory.delete_domain(&domain).await?;
        }

        let database_name = tenant.database_name();
        if self.provider.database_exists(&database_name).await? {
            self.provider.drop_database(&database_name).await?;
        }

        self.directory.delete_tenant(id).await?;
        self.cache.delete_prefix(&tenant.cache_prefix()).await?;
        info!(tenant_id = %id, "Tenant deprovisioned");
        Ok(())
    }

    /// Move a tenant to a new lifecycle status.
    ///
    /// Illegal transitions fail with [`TenantError::InvalidTransition`] and
    /// change nothing.
    pub async fn transition(&self, id: Uuid, to: TenantStatus) -> Result<Tenant, TenantError> {
        let mut tenant = self
            .directory
            .get_tenant(id)
            .await?
            .ok_or_else(|| TenantError::NotFound(id.to_string()))?;

        if !tenant.status.can_transition(to) {
            return Err(TenantError::InvalidTransition {
                from: tenant.status,
                to,
            });
        }

        let from = tenant.status;
        tenant.status = to;
        tenant.updated_at = Utc::now();
        self.directory.update_tenant(&tenant).await?;
        info!(tenant_id = %id, %from, %to, "Tenant status changed");
        Ok(tenant)
    }

    pub async fn suspend_tenant(&self, id: Uuid) -> Result<Tenant, TenantError> {
        self.transition(id, TenantStatus::Suspended).await
    }

    pub async fn activate_tenant(&self, id: Uuid) -> Result<Tenant, TenantError> {
        self.transition(id, TenantStatus::Active).await
    }

    pub async fn deactivate_tenant(&self, id: Uuid) -> Result<Tenant, TenantError> {
        self.transition(id, TenantStatus::Inactive).await
    }
}
