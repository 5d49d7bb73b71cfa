//! Evaluation of a [`Check`] against a captured [`HttpResponse`].
//!
//! Stages run in a fixed order and stop at the first one that fails:
//!
//! 1. status code equality
//! 2. every `all_match` string is in the body
//! 3. at least one `match` string is in the body
//! 4. no `no_match` string is in the body
//! 5. every `headers` rule finds a header value containing its value
//! 6. no `no_headers` rule finds a header value containing its value
//!
//! Body and header comparisons are byte-exact and header names are looked up
//! case-sensitively. An empty `match` list can never be satisfied, so a check
//! without any `match` strings never matches.

use std::fmt;

use memchr::memmem;
use tracing::trace;

use crate::error::MatchError;
use crate::response::HttpResponse;
use crate::signatures::{Check, HeaderRule};

/// The stage at which a check stopped matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Status,
    MatchAll,
    MatchOne,
    NoMatch,
    Headers,
    NoHeaders,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Status => "status",
            Stage::MatchAll => "all_match",
            Stage::MatchOne => "match",
            Stage::NoMatch => "no_match",
            Stage::Headers => "headers",
            Stage::NoHeaders => "no_headers",
        };
        f.write_str(label)
    }
}

impl Check {
    /// Evaluate this check against `resp`.
    ///
    /// Returns `Ok(false)` when the response does not match. Errors are
    /// reserved for a check without `status_code` and for malformed header
    /// rules reached during evaluation.
    pub fn matches(&self, resp: &HttpResponse) -> Result<bool, MatchError> {
        match_check(Some(self), Some(resp))
    }

    /// The first stage that rejects `resp`, or `None` when the check matches.
    pub fn first_mismatch(&self, resp: &HttpResponse) -> Result<Option<Stage>, MatchError> {
        let expected_status = self
            .status_code()
            .ok_or(MatchError::NilParameter("check.StatusCode"))?;
        first_failing_stage(self, expected_status, resp)
    }
}

/// Evaluate an optional check against an optional response.
///
/// Missing inputs are reported as [`MatchError::NilParameter`], checked in
/// the order check, `check.StatusCode`, response.
pub fn match_check(
    check: Option<&Check>,
    resp: Option<&HttpResponse>,
) -> Result<bool, MatchError> {
    let check = check.ok_or(MatchError::NilParameter("check"))?;
    let expected_status = check
        .status_code()
        .ok_or(MatchError::NilParameter("check.StatusCode"))?;
    let resp = resp.ok_or(MatchError::NilParameter("resp"))?;

    match first_failing_stage(check, expected_status, resp)? {
        None => Ok(true),
        Some(stage) => {
            trace!(check = check.name(), %stage, "Check did not match");
            Ok(false)
        }
    }
}

fn first_failing_stage(
    check: &Check,
    expected_status: u16,
    resp: &HttpResponse,
) -> Result<Option<Stage>, MatchError> {
    if resp.status_code != expected_status {
        return Ok(Some(Stage::Status));
    }

    let body = &resp.body[..];

    if !check
        .must_match_all()
        .iter()
        .all(|pattern| body_contains(body, pattern))
    {
        return Ok(Some(Stage::MatchAll));
    }

    if !check
        .must_match_one()
        .iter()
        .any(|pattern| body_contains(body, pattern))
    {
        return Ok(Some(Stage::MatchOne));
    }

    if check
        .must_not_match()
        .iter()
        .any(|pattern| body_contains(body, pattern))
    {
        return Ok(Some(Stage::NoMatch));
    }

    for raw in check.headers() {
        let rule = HeaderRule::parse(raw)?;
        if !header_matches(resp, &rule) {
            return Ok(Some(Stage::Headers));
        }
    }

    for raw in check.no_headers() {
        let rule = HeaderRule::parse(raw)?;
        if header_matches(resp, &rule) {
            return Ok(Some(Stage::NoHeaders));
        }
    }

    Ok(None)
}

#[inline]
fn body_contains(body: &[u8], pattern: &str) -> bool {
    memmem::find(body, pattern.as_bytes()).is_some()
}

/// True when the response has header `rule.name` with a value containing
/// `rule.value`.
fn header_matches(resp: &HttpResponse, rule: &HeaderRule<'_>) -> bool {
    resp.header_values(rule.name)
        .is_some_and(|values| values.iter().any(|v| v.contains(rule.value)))
}
