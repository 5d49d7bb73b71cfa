//! Signature model: the typed form of a rules file.
//!
//! A [`SignatureSet`] holds [`Plugin`]s; each plugin lists the endpoints to
//! request and the [`Check`]s evaluated against every response. Values are
//! built once (by deserializing a rules file or through [`CheckBuilder`]) and
//! only read afterwards, so a loaded set can be shared across threads behind
//! an `Arc` without locking.
//!
//! ```yaml
//! plugins:
//!   - endpoints: ["/wp-login.php"]
//!     follow_redirects: false
//!     checks:
//!       - name: wordpress-login
//!         status_code: 200
//!         all_match: ["WordPress"]
//!         match: ["wp-submit"]
//!         headers: ["X-Powered-By:PHP"]
//!         severity: high
//!         description: WordPress login page is exposed
//!         remediation: Restrict access to the login page
//! ```

use serde::{Deserialize, Serialize};

use crate::error::InvalidHeaderFormat;

/// Root of a rules file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SignatureSet {
    #[serde(default)]
    plugins: Vec<Plugin>,
}

impl SignatureSet {
    /// Build a set from plugins constructed in code. The result is not
    /// validated; see [`crate::validate`].
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Every check of every plugin, in document order.
    pub fn checks(&self) -> impl Iterator<Item = (&Plugin, &Check)> {
        self.plugins
            .iter()
            .flat_map(|plugin| plugin.checks.iter().map(move |check| (plugin, check)))
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// One vulnerability probe: endpoints to request and checks to run on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Plugin {
    #[serde(default)]
    endpoints: Vec<String>,
    #[serde(default)]
    checks: Vec<Check>,
    /// Tells the HTTP client whether to follow redirects for these endpoints.
    #[serde(default)]
    follow_redirects: bool,
}

impl Plugin {
    pub fn new(endpoints: Vec<String>, checks: Vec<Check>, follow_redirects: bool) -> Self {
        Self {
            endpoints,
            checks,
            follow_redirects,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// Whether `endpoint` is one of the paths this plugin probes.
    pub fn targets(&self, endpoint: &str) -> bool {
        self.endpoints.iter().any(|e| e == endpoint)
    }
}

/// A single matching rule evaluated against one HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Check {
    /// At least one must appear in the body.
    #[serde(rename = "match", default)]
    must_match_one: Vec<String>,
    /// All must appear in the body.
    #[serde(rename = "all_match", default)]
    must_match_all: Vec<String>,
    /// None may appear in the body.
    #[serde(rename = "no_match", default)]
    must_not_match: Vec<String>,
    /// Optional in the file, required by the match engine.
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    remediation: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    description: String,
    /// `KEY:VALUE` rules that must all be satisfied.
    #[serde(default)]
    headers: Vec<String>,
    /// `KEY:VALUE` rules that must all be absent.
    #[serde(default)]
    no_headers: Vec<String>,
}

impl Check {
    pub fn builder() -> CheckBuilder {
        CheckBuilder::default()
    }

    pub fn must_match_one(&self) -> &[String] {
        &self.must_match_one
    }

    pub fn must_match_all(&self) -> &[String] {
        &self.must_match_all
    }

    pub fn must_not_match(&self) -> &[String] {
        &self.must_not_match
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn remediation(&self) -> &str {
        &self.remediation
    }

    /// Severity label exactly as written in the rules file.
    pub fn severity(&self) -> &str {
        &self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn no_headers(&self) -> &[String] {
        &self.no_headers
    }
}

/// Builds a [`Check`] in code, for callers that do not go through a rules file.
#[derive(Debug, Clone, Default)]
pub struct CheckBuilder {
    check: Check,
}

impl CheckBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.check.name = name.into();
        self
    }

    pub fn status_code(mut self, status: u16) -> Self {
        self.check.status_code = Some(status);
        self
    }

    pub fn match_one(mut self, pattern: impl Into<String>) -> Self {
        self.check.must_match_one.push(pattern.into());
        self
    }

    pub fn match_all(mut self, pattern: impl Into<String>) -> Self {
        self.check.must_match_all.push(pattern.into());
        self
    }

    pub fn no_match(mut self, pattern: impl Into<String>) -> Self {
        self.check.must_not_match.push(pattern.into());
        self
    }

    pub fn header(mut self, rule: impl Into<String>) -> Self {
        self.check.headers.push(rule.into());
        self
    }

    pub fn no_header(mut self, rule: impl Into<String>) -> Self {
        self.check.no_headers.push(rule.into());
        self
    }

    pub fn severity(mut self, severity: impl Into<String>) -> Self {
        self.check.severity = severity.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.check.description = description.into();
        self
    }

    pub fn remediation(mut self, remediation: impl Into<String>) -> Self {
        self.check.remediation = remediation.into();
        self
    }

    pub fn build(self) -> Check {
        self.check
    }
}

/// A `KEY:VALUE` header rule split into its two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRule<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> HeaderRule<'a> {
    /// Split a raw rule on its single `:`. Zero or several colons are rejected,
    /// so values such as URLs cannot be expressed.
    pub fn parse(raw: &'a str) -> Result<Self, InvalidHeaderFormat> {
        match raw.split_once(':') {
            Some((name, value)) if !value.contains(':') => Ok(Self { name, value }),
            _ => Err(InvalidHeaderFormat::new(raw)),
        }
    }
}
