use super::ssm::SecretResolver;
use crate::config::ParameterNames;
use crate::error::ViewerError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Connection credentials plus the target table, resolved for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .finish()
    }
}

/// Resolves the five database parameters concurrently.
#[derive(Clone)]
pub struct ConfigAssembler {
    resolver: Arc<dyn SecretResolver>,
    names: ParameterNames,
    timeout: Duration,
}

impl ConfigAssembler {
    pub fn new(resolver: Arc<dyn SecretResolver>, names: ParameterNames, timeout: Duration) -> Self {
        Self {
            resolver,
            names,
            timeout,
        }
    }

    /// All five lookups run at once; the first failure aborts the rest and
    /// no partial config is returned.
    pub async fn assemble_config(&self) -> Result<DatabaseConfig, ViewerError> {
        let names = &self.names;
        let (host, user, password, database, table) = futures::try_join!(
            self.resolve_one(&names.host),
            self.resolve_one(&names.username),
            self.resolve_one(&names.password),
            self.resolve_one(&names.database),
            self.resolve_one(&names.table),
        )
        .map_err(ViewerError::config_resolution)?;

        debug!(host = %host, database = %database, table = %table, "database config assembled");
        Ok(DatabaseConfig {
            host,
            user,
            password,
            database,
            table,
        })
    }

    async fn resolve_one(&self, name: &str) -> Result<String, ViewerError> {
        let value = tokio::time::timeout(self.timeout, self.resolver.resolve(name))
            .await
            .map_err(|_| ViewerError::timeout(format!("lookup of parameter {name}"), self.timeout))??;
        if value.trim().is_empty() {
            return Err(ViewerError::EmptyParameter {
                name: name.to_string(),
            });
        }
        Ok(value)
    }
}
