//! Database Per Tenant
//!
//! Every tenant owns one isolated database, named deterministically from the
//! tenant id. The provider trait is implemented against the real database
//! server; the in-memory provider backs tests and examples.

use crate::error::TenantError;
use crate::provisioning::{NewUser, User, UserStore};
use crate::seeding::RoleStore;
use crate::tenant::Tenant;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Database server operations needed for tenant isolation.
///
/// Implement this with your database client. All operations are keyed by
/// database name; the tenant context layer guarantees callers only ever see
/// the name of the tenant they switched to.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Create a database. Schema creation is typically non-transactional;
    /// callers compensate on failure rather than rely on rollback.
    async fn create_database(&self, database: &str) -> Result<(), TenantError>;

    /// Drop a database and everything in it
    async fn drop_database(&self, database: &str) -> Result<(), TenantError>;

    async fn database_exists(&self, database: &str) -> Result<bool, TenantError>;

    /// Execute a statement against a database
    async fn execute(&self, database: &str, statement: &str) -> Result<(), TenantError>;

    /// Toggle foreign key enforcement for a database.
    ///
    /// Only the seeding truncation window disables constraints, and it must
    /// re-enable them immediately after.
    async fn set_foreign_key_checks(
        &self,
        database: &str,
        enabled: bool,
    ) -> Result<(), TenantError>;
}

/// Handle on one tenant's isolated database.
///
/// Carries the derived database name so downstream code never names a
/// database itself.
#[derive(Clone)]
pub struct TenantDatabase {
    name: String,
    provider: Arc<dyn DatabaseProvider>,
}

impl TenantDatabase {
    pub fn new(tenant: &Tenant, provider: Arc<dyn DatabaseProvider>) -> Self {
        Self {
            name: tenant.database_name(),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn execute(&self, statement: &str) -> Result<(), TenantError> {
        self.provider.execute(&self.name, statement).await
    }

    pub async fn set_foreign_key_checks(&self, enabled: bool) -> Result<(), TenantError> {
        self.provider.set_foreign_key_checks(&self.name, enabled).await
    }
}

#[derive(Debug)]
struct DatabaseTables {
    statements: Vec<String>,
    users: Vec<User>,
    // role name -> attached permission slugs, in attachment order
    roles: BTreeMap<String, Vec<String>>,
    permissions: BTreeSet<String>,
    foreign_keys_enabled: bool,
}

impl Default for DatabaseTables {
    fn default() -> Self {
        Self {
            statements: Vec::new(),
            users: Vec::new(),
            roles: BTreeMap::new(),
            permissions: BTreeSet::new(),
            foreign_keys_enabled: true,
        }
    }
}

/// In-memory database server for tests and examples.
///
/// Also implements the tenant-schema stores ([`UserStore`], [`RoleStore`]) so
/// a single instance can back a whole provisioning flow. A statement failure
/// can be injected to exercise rollback paths.
#[derive(Default)]
pub struct InMemoryDatabaseProvider {
    databases: RwLock<HashMap<String, DatabaseTables>>,
    fail_on: RwLock<Option<String>>,
}

impl InMemoryDatabaseProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `execute` fail for any statement containing `fragment`
    pub fn fail_on_statement(&self, fragment: impl Into<String>) {
        *self.fail_on.write() = Some(fragment.into());
    }

    pub fn clear_failure(&self) {
        *self.fail_on.write() = None;
    }

    /// Statements executed against a database, in order
    pub fn executed_statements(&self, database: &str) -> Vec<String> {
        self.databases
            .read()
            .get(database)
            .map(|tables| tables.statements.clone())
            .unwrap_or_default()
    }

    pub fn database_names(&self) -> Vec<String> {
        self.databases.read().keys().cloned().collect()
    }

    fn with_tables<T>(
        &self,
        database: &str,
        f: impl FnOnce(&mut DatabaseTables) -> Result<T, TenantError>,
    ) -> Result<T, TenantError> {
        let mut databases = self.databases.write();
        let tables = databases
            .get_mut(database)
            .ok_or_else(|| TenantError::Storage(format!("database {database} does not exist")))?;
        f(tables)
    }
}

#[async_trait]
impl DatabaseProvider for InMemoryDatabaseProvider {
    async fn create_database(&self, database: &str) -> Result<(), TenantError> {
        let mut databases = self.databases.write();
        if databases.contains_key(database) {
            return Err(TenantError::Storage(format!(
                "database {database} already exists"
            )));
        }
        databases.insert(database.to_string(), DatabaseTables::default());
        debug!(database, "Database created");
        Ok(())
    }

    async fn drop_database(&self, database: &str) -> Result<(), TenantError> {
        let removed = self.databases.write().remove(database);
        if removed.is_none() {
            return Err(TenantError::Storage(format!(
                "database {database} does not exist"
            )));
        }
        debug!(database, "Database dropped");
        Ok(())
    }

    async fn database_exists(&self, database: &str) -> Result<bool, TenantError> {
        Ok(self.databases.read().contains_key(database))
    }

    async fn execute(&self, database: &str, statement: &str) -> Result<(), TenantError> {
        if let Some(fragment) = self.fail_on.read().as_ref() {
            if statement.contains(fragment.as_str()) {
                return Err(TenantError::Storage(format!(
                    "injected failure executing: {statement}"
                )));
            }
        }
        self.with_tables(database, |tables| {
            tables.statements.push(statement.to_string());
            Ok(())
        })
    }

    async fn set_foreign_key_checks(
        &self,
        database: &str,
        enabled: bool,
    ) -> Result<(), TenantError> {
        self.with_tables(database, |tables| {
            tables.foreign_keys_enabled = enabled;
            Ok(())
        })
    }
}

#[async_trait]
impl UserStore for InMemoryDatabaseProvider {
    async fn create_user(
        &self,
        database: &str,
        new_user: &NewUser,
        role: &str,
    ) -> Result<User, TenantError> {
        self.with_tables(database, |tables| {
            if tables.users.iter().any(|user| user.email == new_user.email) {
                return Err(TenantError::Storage(format!(
                    "user {} already exists",
                    new_user.email
                )));
            }
            let user = User {
                id: Uuid::new_v4(),
                name: new_user.name.clone(),
                email: new_user.email.clone(),
                role: role.to_string(),
                created_at: Utc::now(),
            };
            tables.users.push(user.clone());
            Ok(user)
        })
    }

    async fn find_by_email(
        &self,
        database: &str,
        email: &str,
    ) -> Result<Option<User>, TenantError> {
        self.with_tables(database, |tables| {
            Ok(tables.users.iter().find(|user| user.email == email).cloned())
        })
    }

    async fn user_count(&self, database: &str) -> Result<u64, TenantError> {
        self.with_tables(database, |tables| Ok(tables.users.len() as u64))
    }
}

#[async_trait]
impl RoleStore for InMemoryDatabaseProvider {
    async fn upsert_role(&self, database: &str, name: &str) -> Result<(), TenantError> {
        self.with_tables(database, |tables| {
            tables.roles.entry(name.to_string()).or_default();
            Ok(())
        })
    }

    async fn upsert_permission(&self, database: &str, slug: &str) -> Result<(), TenantError> {
        self.with_tables(database, |tables| {
            tables.permissions.insert(slug.to_string());
            Ok(())
        })
    }

    async fn attach_permissions(
        &self,
        database: &str,
        role: &str,
        slugs: &[String],
    ) -> Result<(), TenantError> {
        self.with_tables(database, |tables| {
            let attached = tables
                .roles
                .get_mut(role)
                .ok_or_else(|| TenantError::Storage(format!("role {role} does not exist")))?;
            // Replace, never accumulate
            *attached = slugs.to_vec();
            Ok(())
        })
    }

    async fn role_names(&self, database: &str) -> Result<Vec<String>, TenantError> {
        self.with_tables(database, |tables| Ok(tables.roles.keys().cloned().collect()))
    }

    async fn permission_slugs(&self, database: &str) -> Result<Vec<String>, TenantError> {
        self.with_tables(database, |tables| {
            Ok(tables.permissions.iter().cloned().collect())
        })
    }

    async fn permissions_of(&self, database: &str, role: &str) -> Result<Vec<String>, TenantError> {
        self.with_tables(database, |tables| {
            Ok(tables.roles.get(role).cloned().unwrap_or_default())
        })
    }

    async fn truncate_roles(&self, database: &str) -> Result<(), TenantError> {
        self.with_tables(database, |tables| {
            if tables.foreign_keys_enabled {
                return Err(TenantError::Storage(
                    "cannot truncate role tables while foreign keys are enforced".to_string(),
                ));
            }
            tables.roles.clear();
            tables.permissions.clear();
            Ok(())
        })
    }
}
