//! Client configuration.

use crate::identifier::IdGenerator;
use crate::transport::Transport;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default collection host.
pub const DEFAULT_HOSTNAME: &str = "https://www.google-analytics.com";

/// Default collection path.
pub const DEFAULT_PATH: &str = "/collect";

/// Measurement protocol version stamped as `v`.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Custom metrics (`cm1`, `cm2`, ...).
pub const CUSTOM_METRIC_PATTERN: &str = "^cm[0-9]+$";

/// Custom dimensions (`cd1`, `cd2`, ...).
pub const CUSTOM_DIMENSION_PATTERN: &str = "^cd[0-9]+$";

/// Parameter codes the collection endpoint understands.
pub const ACCEPTED_PARAMETERS: &[&str] = &[
    "v", "tid", "aip", "ds", "qt", "z", "cid", "uid", "sc", "uip", "ua", "geoid", "dr", "cn",
    "cs", "cm", "ck", "cc", "ci", "gclid", "dclid", "sr", "vp", "de", "sd", "ul", "je", "fl",
    "t", "ni", "dl", "dh", "dp", "dt", "p", "linkid", "an", "aid", "av", "aiid", "ec", "ea",
    "el", "ev", "ti", "ta", "tr", "ts", "tt", "in", "ip", "iq", "ic", "iv", "cu", "sn", "sa",
    "st", "utc", "utv", "utt", "utl", "exd", "exf", "xid", "xvar",
];

/// Endpoint configuration shared by every fork of a visitor.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) hostname: String,
    pub(crate) path: String,
    pub(crate) protocol_version: String,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: Option<String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) accepted_parameters: HashSet<String>,
    pub(crate) custom_metric_pattern: Regex,
    pub(crate) custom_dimension_pattern: Regex,
}

impl Config {
    /// Get the collection host.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Get the collection path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full collection URL without a query.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.hostname, self.path)
    }

    /// Get the protocol version.
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.headers.clone();
        if let Some(ua) = &self.user_agent {
            headers.insert("User-Agent".into(), ua.clone());
        }
        headers
    }

    /// Whether the endpoint is known to accept `code`.
    pub fn accepts(&self, code: &str) -> bool {
        self.accepted_parameters.contains(code)
            || self.custom_metric_pattern.is_match(code)
            || self.custom_dimension_pattern.is_match(code)
    }
}

/// Builder for [`Visitor`](crate::Visitor).
pub struct VisitorBuilder {
    pub(crate) tracking_id: Option<String>,
    pub(crate) client_id: Option<String>,
    pub(crate) user_id: Option<String>,
    pub(crate) strict_cid_format: bool,
    pub(crate) debug: bool,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) id_generator: Option<Arc<dyn IdGenerator>>,
    hostname: Option<String>,
    path: Option<String>,
    protocol_version: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    headers: BTreeMap<String, String>,
    extra_parameters: Vec<String>,
}

impl fmt::Debug for VisitorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorBuilder")
            .field("tracking_id", &self.tracking_id)
            .field("client_id", &self.client_id)
            .field("user_id", &self.user_id)
            .field("strict_cid_format", &self.strict_cid_format)
            .field("debug", &self.debug)
            .field("hostname", &self.hostname)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Default for VisitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitorBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            tracking_id: None,
            client_id: None,
            user_id: None,
            strict_cid_format: true,
            debug: false,
            transport: None,
            id_generator: None,
            hostname: None,
            path: None,
            protocol_version: None,
            timeout: None,
            user_agent: None,
            headers: BTreeMap::new(),
            extra_parameters: Vec::new(),
        }
    }

    /// Set the tracking id of the receiving property.
    pub fn tracking_id(mut self, tid: impl Into<String>) -> Self {
        self.tracking_id = Some(tid.into());
        self
    }

    /// Set the client id. Invalid ids are replaced unless strict format is off.
    pub fn client_id(mut self, cid: impl Into<String>) -> Self {
        self.client_id = Some(cid.into());
        self
    }

    /// Stamp every hit with this user id (`uid`).
    pub fn user_id(mut self, uid: impl Into<String>) -> Self {
        self.user_id = Some(uid.into());
        self
    }

    /// Require client ids to be UUIDs (default `true`).
    pub fn strict_cid_format(mut self, strict: bool) -> Self {
        self.strict_cid_format = strict;
        self
    }

    /// Enable per-hit debug logging.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the collection host.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the collection path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Override the protocol version.
    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Treat an extra parameter code as supported.
    pub fn accept_parameter(mut self, code: impl Into<String>) -> Self {
        self.extra_parameters.push(code.into());
        self
    }

    /// Deliver hits through a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Generate missing client ids with a custom generator.
    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }

    /// Build the endpoint configuration.
    pub(crate) fn build_config(&mut self) -> Result<Config, crate::Error> {
        let hostname = self
            .hostname
            .take()
            .unwrap_or_else(|| DEFAULT_HOSTNAME.into());
        if hostname.is_empty() {
            return Err(crate::Error::Config("hostname cannot be empty".into()));
        }

        let path = self.path.take().unwrap_or_else(|| DEFAULT_PATH.into());
        if path.is_empty() {
            return Err(crate::Error::Config("path cannot be empty".into()));
        }

        let custom_metric_pattern = Regex::new(CUSTOM_METRIC_PATTERN)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        let custom_dimension_pattern = Regex::new(CUSTOM_DIMENSION_PATTERN)
            .map_err(|e| crate::Error::Config(e.to_string()))?;

        let mut accepted_parameters: HashSet<String> =
            ACCEPTED_PARAMETERS.iter().map(|p| p.to_string()).collect();
        accepted_parameters.extend(self.extra_parameters.drain(..));

        Ok(Config {
            hostname,
            path,
            protocol_version: self
                .protocol_version
                .take()
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.into()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self.user_agent.take(),
            headers: std::mem::take(&mut self.headers),
            accepted_parameters,
            custom_metric_pattern,
            custom_dimension_pattern,
        })
    }
}
