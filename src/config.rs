use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_DB_NAME: &str = "jobwizard.db";
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8080",
    "http://localhost:8888",
    "http://localhost:80",
];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Where the server writes its `kill -9 <pid>` script. `None` means next to the executable.
    pub pid_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            let name = lookup("JOBWIZARD_DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.into());
            format!("sqlite:{}", name)
        });
        let port = match lookup("APP_PORT").or_else(|| lookup("JOBWIZARD_API_PORT")) {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("APP_PORT must be a valid port number, got {v:?}"))?,
            None => 8080,
        };
        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());
        if cors_origins.iter().any(|o| o == "*") {
            anyhow::bail!(
                "CORS_ORIGINS must list explicit origins; \"*\" cannot be used with credentials"
            );
        }

        Ok(Self {
            database_url,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(5),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            cors_origins,
            pid_file: lookup("JOBWIZARD_PID_FILE").map(PathBuf::from),
        })
    }
}
