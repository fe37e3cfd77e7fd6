//! Tenant Schema Migrations
//!
//! Every freshly provisioned tenant database gets the same baseline schema,
//! applied as an ordered list of named migrations. The runner executes them
//! sequentially and stops at the first failure so the orchestrator can tear
//! the half-built database down.

use crate::database::TenantDatabase;
use crate::error::TenantError;
use tracing::info;

/// One named schema migration, an ordered batch of DDL statements
#[derive(Debug, Clone)]
pub struct Migration {
    pub name: &'static str,
    pub statements: Vec<&'static str>,
}

impl Migration {
    pub fn new(name: &'static str, statements: Vec<&'static str>) -> Self {
        Self { name, statements }
    }
}

/// The schema every tenant database starts with
pub fn baseline_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            "create_users",
            vec![
                "CREATE TABLE users (\
                 id CHAR(36) PRIMARY KEY, \
                 name VARCHAR(255) NOT NULL, \
                 email VARCHAR(255) NOT NULL UNIQUE, \
                 password_hash VARCHAR(255) NOT NULL, \
                 created_at TIMESTAMP NOT NULL)",
            ],
        ),
        Migration::new(
            "create_roles_and_permissions",
            vec![
                "CREATE TABLE roles (\
                 id INT AUTO_INCREMENT PRIMARY KEY, \
                 name VARCHAR(255) NOT NULL UNIQUE)",
                "CREATE TABLE permissions (\
                 id INT AUTO_INCREMENT PRIMARY KEY, \
                 slug VARCHAR(255) NOT NULL UNIQUE)",
                "CREATE TABLE role_permissions (\
                 role_id INT NOT NULL REFERENCES roles(id), \
                 permission_id INT NOT NULL REFERENCES permissions(id), \
                 PRIMARY KEY (role_id, permission_id))",
                "CREATE TABLE user_roles (\
                 user_id CHAR(36) NOT NULL REFERENCES users(id), \
                 role_id INT NOT NULL REFERENCES roles(id), \
                 PRIMARY KEY (user_id, role_id))",
            ],
        ),
        Migration::new(
            "create_catalog",
            vec![
                "CREATE TABLE products (\
                 id CHAR(36) PRIMARY KEY, \
                 name VARCHAR(255) NOT NULL, \
                 price_cents BIGINT NOT NULL, \
                 created_at TIMESTAMP NOT NULL)",
                "CREATE TABLE orders (\
                 id CHAR(36) PRIMARY KEY, \
                 user_id CHAR(36) NOT NULL REFERENCES users(id), \
                 total_cents BIGINT NOT NULL, \
                 created_at TIMESTAMP NOT NULL)",
            ],
        ),
    ]
}

/// Applies migrations to one tenant database, in order
pub struct MigrationRunner {
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self { migrations }
    }

    pub fn baseline() -> Self {
        Self::new(baseline_migrations())
    }

    pub fn migration_names(&self) -> Vec<&'static str> {
        self.migrations.iter().map(|m| m.name).collect()
    }

    /// Run every migration against the database.
    ///
    /// Fails fast on the first statement error; partially applied schema is
    /// the caller's problem to compensate for (drop the database).
    pub async fn run_all(&self, database: &TenantDatabase) -> Result<(), TenantError> {
        for migration in &self.migrations {
            for statement in &migration.statements {
                database.execute(statement).await?;
            }
            info!(
                database = database.name(),
                migration = migration.name,
                "Migration applied"
            );
        }
        Ok(())
    }
}
