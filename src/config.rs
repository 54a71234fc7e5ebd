use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

/// Environment prefix for overrides, e.g. `EVENT_VIEWER_REGION=eu-west-1`
/// or `EVENT_VIEWER_PARAMETERS__TABLE=/prod/RDSTable`.
pub const ENV_PREFIX: &str = "EVENT_VIEWER_";

/// Process-wide settings. Database credentials are *not* here; they are
/// resolved from the parameter store on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    pub region: String,
    /// Endpoint override for the SSM client (LocalStack and friends).
    pub ssm_endpoint: Option<String>,
    pub parameters: ParameterNames,
    pub secret_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

/// Names of the five parameters that make up a `DatabaseConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterNames {
    pub host: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub table: String,
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self {
            host: "/tryout1/RDSHost".to_string(),
            username: "/tryout1/RDSUsername".to_string(),
            password: "/tryout1/RDSPassword".to_string(),
            database: "/tryout1/RDSDatabase".to_string(),
            table: "/tryout1/RDSTable".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            loglevel: "info".to_string(),
            region: "us-east-1".to_string(),
            ssm_endpoint: None,
            parameters: ParameterNames::default(),
            secret_timeout_secs: 10,
            connect_timeout_secs: 10,
            query_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Defaults layered under `EVENT_VIEWER_*` environment variables.
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            secret: Duration::from_secs(self.secret_timeout_secs.max(1)),
            connect: Duration::from_secs(self.connect_timeout_secs.max(1)),
            query: Duration::from_secs(self.query_timeout_secs.max(1)),
        }
    }
}

/// Deadlines applied to every outbound call of a request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub secret: Duration,
    pub connect: Duration,
    pub query: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Config::default().timeouts()
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("FATAL: invalid EVENT_VIEWER_* configuration")
});
