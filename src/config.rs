//! Client configuration: API roots, credentials and transport options.

use std::fmt;
use std::time::Duration;

use crate::ClientError;

/// Production root of the "out" (data plane) API.
pub const DEFAULT_OUT_API: &str = "http://out.api.v2.smartdata.io";
/// Production root of the "in" (control plane) API.
pub const DEFAULT_IN_API: &str = "http://in.api.v2.smartdata.io";

/// Login/password pair sent as the `login` and `password` headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    login: String,
    password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration shared by [`crate::SmartDataClient`] and
/// [`crate::BlockingSmartDataClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Root URL of the "out" API (stream contents).
    pub out_api: String,
    /// Root URL of the "in" API (stream and source administration).
    pub in_api: String,
    /// Forwarding proxy every request is routed through, if any.
    pub proxy: Option<String>,
    /// Total request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    pub credentials: Credentials,
}

impl ClientConfig {
    /// Creates a configuration targeting the production API roots.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            out_api: DEFAULT_OUT_API.to_owned(),
            in_api: DEFAULT_IN_API.to_owned(),
            proxy: None,
            timeout: None,
            credentials,
        }
    }

    #[must_use]
    pub fn with_out_api(mut self, url: impl Into<String>) -> Self {
        self.out_api = url.into();
        self
    }

    #[must_use]
    pub fn with_in_api(mut self, url: impl Into<String>) -> Self {
        self.in_api = url.into();
        self
    }

    /// Routes every request through the given forwarding proxy.
    #[must_use]
    pub fn with_proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SMARTDATA_LOGIN`: account login (required)
    /// - `SMARTDATA_PASSWORD`: account password (required)
    /// - `SMARTDATA_OUT_URL`: "out" API root (default: [`DEFAULT_OUT_API`])
    /// - `SMARTDATA_IN_URL`: "in" API root (default: [`DEFAULT_IN_API`])
    /// - `SMARTDATA_PROXY`: forwarding proxy URL (default: none)
    /// - `SMARTDATA_TIMEOUT_MS`: request timeout in milliseconds (default: none)
    pub fn from_env() -> Result<Self, ClientError> {
        let login = required_var("SMARTDATA_LOGIN")?;
        let password = required_var("SMARTDATA_PASSWORD")?;
        let mut config = Self::new(Credentials::new(login, password));

        if let Some(url) = optional_var("SMARTDATA_OUT_URL") {
            config.out_api = url;
        }
        if let Some(url) = optional_var("SMARTDATA_IN_URL") {
            config.in_api = url;
        }
        config.proxy = optional_var("SMARTDATA_PROXY");

        if let Some(raw) = optional_var("SMARTDATA_TIMEOUT_MS") {
            let millis: u64 = raw.parse().map_err(|e| {
                ClientError::Config(format!("invalid SMARTDATA_TIMEOUT_MS '{raw}': {e}"))
            })?;
            config.timeout = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }

    /// Builds the transport proxy for [`Self::proxy`], when one is configured.
    pub(crate) fn build_proxy(&self) -> Result<Option<reqwest::Proxy>, ClientError> {
        self.proxy
            .as_deref()
            .map(|url| {
                reqwest::Proxy::all(url)
                    .map_err(|e| ClientError::Config(format!("invalid proxy URL '{url}': {e}")))
            })
            .transpose()
    }
}

fn required_var(name: &str) -> Result<String, ClientError> {
    optional_var(name).ok_or_else(|| ClientError::Config(format!("{name} not set")))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
