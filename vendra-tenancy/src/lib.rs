//! Multi-Tenancy for Vendra
//!
//! Tenant isolation for a multi-merchant commerce platform: database per
//! tenant, domain-based resolution, scoped tenant context, tenant-aware
//! caching, and full provisioning lifecycle.
//!
//! # Features
//!
//! - 🏢 **Tenant Directory** - Central domain-to-tenant registry with
//!   enforced domain uniqueness
//! - 🗄️ **Database Per Tenant** - One isolated database per merchant,
//!   named deterministically from the tenant id
//! - 🔍 **Domain Resolution** - Requests map to tenants via their Host
//!   header, active tenants only
//! - 🎯 **Scoped Context** - Per-unit-of-work tenant switching with
//!   guaranteed restoration
//! - 💾 **Tenant-Aware Caching** - Automatic cache key namespacing
//! - 🌱 **Role Seeding** - Declarative, idempotent role and permission
//!   structures
//! - 🚀 **Provisioning** - Multi-phase tenant creation with compensating
//!   rollback
//!
//! # Quick Start
//!
//! ## 1. Provision a tenant
//!
//! ```rust,ignore
//! use vendra_tenancy::prelude::*;
//!
//! let provisioner = TenantProvisioner::new(directory, provider, cache, users, roles);
//!
//! let request = CreateTenantRequest::new(
//!     "Acme Store",
//!     "acme.example.com",
//!     NewUser::new("Ada", "owner@acme.example", password_hash),
//! );
//! let tenant = provisioner.create_tenant(&request).await?;
//! assert!(tenant.is_active());
//! ```
//!
//! ## 2. Resolve the tenant of a request
//!
//! ```rust,ignore
//! let resolver = DomainTenantResolver::new(directory);
//! let tenant = resolver.resolve(&request).await?;
//! ```
//!
//! ## 3. Work inside the tenant's context
//!
//! ```rust,ignore
//! let contexts = TenantContextManager::new(provider, cache);
//! contexts
//!     .run_in_tenant_context(&tenant, |active| async move {
//!         active.database().execute("INSERT INTO orders ...").await?;
//!         active.cache().set("dashboard", payload).await?;
//!         Ok(())
//!     })
//!     .await?;
//! ```

pub mod cache;
pub mod context;
pub mod database;
pub mod directory;
pub mod error;
pub mod migration;
pub mod provisioning;
pub mod seeding;
pub mod tenant;

pub use cache::{CacheProvider, InMemoryCacheProvider, TenantCache};
pub use context::{ActiveTenant, ContextState, TenantContextManager};
pub use database::{DatabaseProvider, InMemoryDatabaseProvider, TenantDatabase};
pub use directory::{DomainTenantResolver, InMemoryTenantDirectory, TenantDirectory};
pub use error::TenantError;
pub use migration::{Migration, MigrationRunner, baseline_migrations};
pub use provisioning::{
    CreateTenantRequest, NewUser, TenantProvisioner, User, UserStore,
};
pub use seeding::{Action, RoleSeeder, RoleStore, RoleStructure, merchant_admin_structure};
pub use tenant::{DomainRecord, Tenant, TenantStatus};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{CacheProvider, TenantCache};
    pub use crate::context::{ActiveTenant, TenantContextManager};
    pub use crate::database::{DatabaseProvider, TenantDatabase};
    pub use crate::directory::{DomainTenantResolver, TenantDirectory};
    pub use crate::error::TenantError;
    pub use crate::migration::MigrationRunner;
    pub use crate::provisioning::{CreateTenantRequest, NewUser, TenantProvisioner, UserStore};
    pub use crate::seeding::{RoleSeeder, RoleStore, RoleStructure};
    pub use crate::tenant::{Tenant, TenantStatus};
}
