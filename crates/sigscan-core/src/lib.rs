//! Signature matching for HTTP endpoint inspection.
//!
//! A rules file describes known vulnerability fingerprints as plugins: the
//! endpoints to request and the checks that decide whether a response is
//! vulnerable. This crate loads and validates such files and evaluates
//! already-fetched responses against their checks. It performs no network
//! I/O.
//!
//! # Example
//!
//! ```no_run
//! use sigscan_core::{HttpResponse, SignatureSet};
//!
//! let signatures = SignatureSet::from_file("signatures.yaml")?;
//!
//! let resp = HttpResponse::new(200)
//!     .with_body("<title>WordPress 5.0</title>")
//!     .with_header("X-Powered-By", "PHP/7.4");
//!
//! for finding in signatures.evaluate("/", &resp)? {
//!     println!("{} [{}]: {}", finding.check, finding.severity, finding.description);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod finding;
mod loader;
mod matcher;
mod report;
mod response;
mod severity;
mod signatures;

pub use error::{InvalidHeaderFormat, LoadError, MatchError};
pub use finding::Finding;
pub use loader::{
    parse_signatures, parse_signatures_slice, reader_from_file, validate, validate_check,
};
pub use matcher::{match_check, Stage};
pub use report::{ReportRow, ReportTable};
pub use response::HttpResponse;
pub use severity::{Severity, UnknownSeverity};
pub use signatures::{Check, CheckBuilder, HeaderRule, Plugin, SignatureSet};
