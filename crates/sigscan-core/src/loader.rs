//! Reading, parsing and validating signatures files.
//!
//! Validation is fail-fast: the first invalid check rejects the whole set, so
//! a [`SignatureSet`] returned from here never contains a check with missing
//! metadata, an unknown severity or a malformed header rule. The presence of
//! `status_code` is left to the match engine.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::severity::Severity;
use crate::signatures::{Check, HeaderRule, SignatureSet};

/// Open a signatures file for reading.
///
/// A path that does not exist yields [`LoadError::PathNotFound`]; any other
/// failure to open is reported as [`LoadError::Io`].
pub fn reader_from_file(path: impl AsRef<Path>) -> Result<BufReader<File>, LoadError> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::PathNotFound(path.to_path_buf()));
        }
        _ => {}
    }

    let file = File::open(path)?;
    Ok(BufReader::new(file))
}

/// Read a whole YAML document from `reader`, deserialize it and validate
/// every check.
pub fn parse_signatures<R: Read>(mut reader: R) -> Result<SignatureSet, LoadError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    parse_signatures_slice(&raw)
}

/// Same as [`parse_signatures`] for a document already in memory.
pub fn parse_signatures_slice(raw: &[u8]) -> Result<SignatureSet, LoadError> {
    let set: SignatureSet = serde_yaml::from_slice(raw)?;
    validate(&set)?;

    info!(
        plugins = set.plugins().len(),
        checks = set.checks().count(),
        "Loaded signatures"
    );
    Ok(set)
}

/// Validate every check of every plugin in document order.
pub fn validate(set: &SignatureSet) -> Result<(), LoadError> {
    for (plugin_idx, plugin) in set.plugins().iter().enumerate() {
        for (check_idx, check) in plugin.checks().iter().enumerate() {
            validate_check(check).inspect_err(|e| {
                debug!(
                    location = %format!("plugins[{plugin_idx}].checks[{check_idx}]"),
                    check = check.name(),
                    error = %e,
                    "Rejected check"
                );
            })?;
        }
    }
    Ok(())
}

/// Validate a single check: metadata, then severity, then header rules.
pub fn validate_check(check: &Check) -> Result<(), LoadError> {
    let required = [
        ("description", check.description()),
        ("remediation", check.remediation()),
        ("severity", check.severity()),
    ];
    for (field, value) in required {
        if value.is_empty() {
            return Err(LoadError::MissingField {
                check: check.name().to_string(),
                field,
            });
        }
    }

    Severity::parse(check.severity())?;

    for raw in check.headers().iter().chain(check.no_headers()) {
        HeaderRule::parse(raw)?;
    }

    Ok(())
}

impl SignatureSet {
    /// Load and validate a signatures file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        parse_signatures(reader_from_file(path)?)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        parse_signatures_slice(yaml.as_bytes())
    }
}
