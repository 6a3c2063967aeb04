use std::time::Duration;

/// Environment variable consulted by [`SessionConfig::from_env`].
pub const URI_ENV: &str = "TSMONGO_URI";

/// Connection settings for [`Session::dial_with_config`](crate::Session::dial_with_config).
///
/// Anything the connection string itself sets (credentials, replica set,
/// read preference, TLS) stays in the URI; the fields below only override
/// what the URI leaves unset or what callers want to pin in code.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub uri: String,
    pub app_name: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub server_selection_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            app_name: Some("tsmongo".to_string()),
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl SessionConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Defaults, with the URI taken from `TSMONGO_URI` when it is set.
    pub fn from_env() -> Self {
        match std::env::var(URI_ENV) {
            Ok(uri) if !uri.trim().is_empty() => Self::new(uri),
            _ => Self::default(),
        }
    }
}
