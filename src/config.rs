use std::fmt;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Connection parameters for one PostgreSQL session.
///
/// Fixed once a `DataStore` is built from them; build a new store to change them.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
    pub application_name: Option<String>,
    pub connect_timeout: Option<Duration>,
}

impl ConnectParams {
    pub const DEFAULT_PORT: u16 = 5432;

    pub fn new(host: impl Into<String>, dbname: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            dbname: dbname.into(),
            user: user.into(),
            password: None,
            application_name: None,
            connect_timeout: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Load parameters from the libpq environment variables:
    /// `PGHOST`, `PGPORT`, `PGDATABASE`, `PGUSER`, `PGPASSWORD`,
    /// `PGAPPNAME` and `PGCONNECT_TIMEOUT` (seconds).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| StoreError::Config(format!("{} is not set", key)))
        };

        let mut params = Self::new(required("PGHOST")?, required("PGDATABASE")?, required("PGUSER")?);

        if let Some(port) = lookup("PGPORT") {
            params.port = port
                .parse()
                .map_err(|_| StoreError::Config(format!("PGPORT is not a port number: {}", port)))?;
        }
        params.password = lookup("PGPASSWORD");
        params.application_name = lookup("PGAPPNAME");
        if let Some(secs) = lookup("PGCONNECT_TIMEOUT") {
            let secs: u64 = secs.parse().map_err(|_| {
                StoreError::Config(format!("PGCONNECT_TIMEOUT is not a number of seconds: {}", secs))
            })?;
            params.connect_timeout = Some(Duration::from_secs(secs));
        }

        Ok(params)
    }

    pub(crate) fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user);
        if let Some(ref password) = self.password {
            config.password(password);
        }
        if let Some(ref name) = self.application_name {
            config.application_name(name);
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout(timeout);
        }
        config
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("application_name", &self.application_name)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
