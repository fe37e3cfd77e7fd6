//! Role and Permission Seeding
//!
//! Declarative role structures (`role -> module -> action list`) seeded into
//! a tenant database. Seeding is idempotent: roles and permissions are
//! upserted and role attachments are replaced wholesale, so running it twice
//! changes nothing. Reseeding truncates the role tables first, inside a
//! foreign-key-checks-disabled window.

use crate::context::ActiveTenant;
use crate::error::TenantError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// CRUD actions a role can hold on a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// Parse one token of an action list. Both the single-letter and the
    /// full-word forms are accepted.
    pub fn parse(token: &str) -> Option<Action> {
        match token.trim() {
            "c" | "create" => Some(Action::Create),
            "r" | "read" => Some(Action::Read),
            "u" | "update" => Some(Action::Update),
            "d" | "delete" => Some(Action::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// The permission slug for this action on a module, e.g. `create-users`
    pub fn slug(&self, module: &str) -> String {
        format!("{}-{}", self.as_str(), module)
    }
}

/// Declarative description of roles and their permissions.
///
/// Maps role name to a map of module name to a comma-separated action list:
///
/// ```json
/// { "merchant_admin": { "users": "c,r,u,d", "orders": "r,u" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleStructure(pub BTreeMap<String, BTreeMap<String, String>>);

impl RoleStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(
        mut self,
        role: impl Into<String>,
        modules: BTreeMap<String, String>,
    ) -> Self {
        self.0.insert(role.into(), modules);
        self
    }

    /// The permission slugs one role grants, deduplicated, in module order.
    /// Unknown action tokens are skipped with a warning.
    pub fn slugs_for(&self, role: &str) -> Vec<String> {
        let Some(modules) = self.0.get(role) else {
            return Vec::new();
        };
        let mut slugs = Vec::new();
        for (module, actions) in modules {
            for token in actions.split(',') {
                match Action::parse(token) {
                    Some(action) => {
                        let slug = action.slug(module);
                        if !slugs.contains(&slug) {
                            slugs.push(slug);
                        }
                    }
                    None => {
                        warn!(role, module, token = token.trim(), "Unknown action token skipped");
                    }
                }
            }
        }
        slugs
    }

    pub fn role_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

/// The role structure every new merchant tenant starts with
pub fn merchant_admin_structure() -> RoleStructure {
    let full = "c,r,u,d".to_string();
    let mut modules = BTreeMap::new();
    modules.insert("users".to_string(), full.clone());
    modules.insert("roles".to_string(), full.clone());
    modules.insert("products".to_string(), full.clone());
    modules.insert("orders".to_string(), full);
    modules.insert("settings".to_string(), "r,u".to_string());
    RoleStructure::new().with_role("merchant_admin", modules)
}

/// Role and permission persistence inside one tenant database.
///
/// Upserts must be keyed on the natural identifier (role name, permission
/// slug) so repeated seeding never duplicates rows.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn upsert_role(&self, database: &str, name: &str) -> Result<(), TenantError>;

    async fn upsert_permission(&self, database: &str, slug: &str) -> Result<(), TenantError>;

    /// Replace a role's permission attachments with exactly `slugs`
    async fn attach_permissions(
        &self,
        database: &str,
        role: &str,
        slugs: &[String],
    ) -> Result<(), TenantError>;

    async fn role_names(&self, database: &str) -> Result<Vec<String>, TenantError>;

    async fn permission_slugs(&self, database: &str) -> Result<Vec<String>, TenantError>;

    async fn permissions_of(&self, database: &str, role: &str) -> Result<Vec<String>, TenantError>;

    /// Empty the role, permission and attachment tables.
    ///
    /// Only legal while foreign key checks are disabled.
    async fn truncate_roles(&self, database: &str) -> Result<(), TenantError>;
}

/// Seeds a role structure into a tenant database
pub struct RoleSeeder {
    store: Arc<dyn RoleStore>,
}

impl RoleSeeder {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Seed the structure into the active tenant's database. Idempotent.
    pub async fn seed_roles(
        &self,
        active: &ActiveTenant,
        structure: &RoleStructure,
    ) -> Result<(), TenantError> {
        let database = active.database().name();
        for role in structure.role_names() {
            self.store.upsert_role(database, role).await?;
            let slugs = structure.slugs_for(role);
            for slug in &slugs {
                self.store.upsert_permission(database, slug).await?;
            }
            self.store.attach_permissions(database, role, &slugs).await?;
            info!(database, role, permissions = slugs.len(), "Role seeded");
        }
        Ok(())
    }

    /// Truncate the role tables and seed from scratch.
    ///
    /// Foreign key checks are disabled only for the truncation itself and
    /// re-enabled before seeding, also when truncation fails.
    pub async fn reseed_roles(
        &self,
        active: &ActiveTenant,
        structure: &RoleStructure,
    ) -> Result<(), TenantError> {
        let database = active.database();
        database.set_foreign_key_checks(false).await?;
        let truncated = self.store.truncate_roles(database.name()).await;
        database.set_foreign_key_checks(true).await?;
        truncated?;

        self.seed_roles(active, structure).await
    }
}
