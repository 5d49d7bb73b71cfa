//! Running plugins against responses and collecting positive matches.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MatchError;
use crate::response::HttpResponse;
use crate::signatures::{Check, Plugin, SignatureSet};

/// A check that matched the response fetched from `endpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Finding {
    pub endpoint: String,
    pub check: String,
    pub severity: String,
    pub description: String,
    pub remediation: String,
}

impl Finding {
    fn new(endpoint: &str, check: &Check) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            check: check.name().to_string(),
            severity: check.severity().to_string(),
            description: check.description().to_string(),
            remediation: check.remediation().to_string(),
        }
    }
}

impl Plugin {
    /// Run every check of this plugin against the response fetched from
    /// `endpoint`. The first match error aborts evaluation.
    pub fn evaluate(
        &self,
        endpoint: &str,
        resp: &HttpResponse,
    ) -> Result<Vec<Finding>, MatchError> {
        let mut findings = Vec::new();
        for check in self.checks() {
            if check.matches(resp)? {
                debug!(endpoint, check = check.name(), "Check matched");
                findings.push(Finding::new(endpoint, check));
            }
        }
        Ok(findings)
    }
}

impl SignatureSet {
    /// Run every plugin that probes `endpoint` against its response.
    pub fn evaluate(
        &self,
        endpoint: &str,
        resp: &HttpResponse,
    ) -> Result<Vec<Finding>, MatchError> {
        let mut findings = Vec::new();
        for plugin in self.plugins().iter().filter(|p| p.targets(endpoint)) {
            findings.extend(plugin.evaluate(endpoint, resp)?);
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, needle: &str) -> Check {
        Check::builder()
            .name(name)
            .status_code(200)
            .match_one(needle)
            .severity("low")
            .description(format!("{name} found"))
            .remediation("remove it")
            .build()
    }

    fn set() -> SignatureSet {
        SignatureSet::new(vec![
            Plugin::new(
                vec!["/".to_string(), "/index.html".to_string()],
                vec![check("apache", "Apache"), check("nginx", "nginx")],
                false,
            ),
            Plugin::new(
                vec!["/.git/HEAD".to_string()],
                vec![check("git-head", "refs/heads")],
                false,
            ),
        ])
    }

    #[test]
    fn test_plugin_collects_matching_checks() {
        let resp = HttpResponse::new(200).with_body("Welcome to nginx!");
        let findings = set().plugins()[0].evaluate("/", &resp).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check, "nginx");
        assert_eq!(findings[0].endpoint, "/");
        assert_eq!(findings[0].description, "nginx found");
        assert_eq!(findings[0].remediation, "remove it");
    }

    #[test]
    fn test_set_only_runs_plugins_for_endpoint() {
        let resp = HttpResponse::new(200).with_body("ref: refs/heads/main nginx");
        let findings = set().evaluate("/.git/HEAD", &resp).unwrap();
        let names: Vec<&str> = findings.iter().map(|f| f.check.as_str()).collect();
        assert_eq!(names, vec!["git-head"]);

        assert!(set().evaluate("/unknown", &resp).unwrap().is_empty());
    }

    #[test]
    fn test_match_error_propagates() {
        let broken = Plugin::new(
            vec!["/".to_string()],
            vec![Check::builder().name("no-status").match_one("x").build()],
            false,
        );
        let resp = HttpResponse::new(200).with_body("x");
        assert_eq!(
            broken.evaluate("/", &resp),
            Err(MatchError::NilParameter("check.StatusCode"))
        );
    }
}
