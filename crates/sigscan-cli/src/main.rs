//! sigscan command-line tool
//!
//! Validates signature files, lists their checks by severity and evaluates
//! captured HTTP responses against them.
//!
//! Usage:
//!   sigscan lint <rules>
//!   sigscan list <rules> --severity high
//!   sigscan match <rules> <response.json> --endpoint /wp-login.php

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sigscan_core::{Finding, HttpResponse, ReportTable, Severity, SignatureSet};
use tracing::{debug, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Exit code for findings present or an invalid rules file.
const EXIT_FINDINGS: u8 = 1;
/// Exit code when a file cannot be loaded or evaluation fails.
const EXIT_ERROR: u8 = 2;

const VERBOSE_DIRECTIVE: &str = "sigscan_core=debug";

/// Signature-driven HTTP endpoint inspector
#[derive(Parser, Debug)]
#[command(name = "sigscan")]
#[command(
    author,
    version,
    about = "Validate signature files and match captured HTTP responses against them"
)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a signatures file
    Lint {
        /// Path to the signatures file
        #[arg(env = "SIGSCAN_RULES")]
        rules: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// List the checks with a given severity
    List {
        /// Path to the signatures file
        #[arg(env = "SIGSCAN_RULES")]
        rules: PathBuf,

        /// Severity label to select (compared exactly)
        #[arg(short, long, env = "SIGSCAN_SEVERITY", default_value = "high")]
        severity: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Evaluate a captured response (JSON or YAML) against the signatures
    Match {
        /// Path to the signatures file
        #[arg(env = "SIGSCAN_RULES")]
        rules: PathBuf,

        /// Path to the captured response
        response: PathBuf,

        /// Endpoint the response was fetched from
        #[arg(short, long, default_value = "/")]
        endpoint: String,

        /// Show the stage at which each non-matching check stopped
        #[arg(long)]
        explain: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{RED}{BOLD}error:{RESET} {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise INFO. `--verbose` adds debug output
/// from the library on top of either.
fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

fn env_filter(verbose: bool) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    match (verbose, VERBOSE_DIRECTIVE.parse::<Directive>()) {
        (true, Ok(directive)) => filter.add_directive(directive),
        _ => filter,
    }
}

fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Lint { rules, output } => Ok(lint(&rules, output)),
        Command::List {
            rules,
            severity,
            output,
        } => {
            let signatures = load_signatures(&rules)?;
            list(&signatures, &severity, output)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Match {
            rules,
            response,
            endpoint,
            explain,
            output,
        } => {
            let signatures = load_signatures(&rules)?;
            let resp = load_response(&response)?;
            let findings = signatures
                .evaluate(&endpoint, &resp)
                .context("failed to evaluate signatures")?;

            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
                OutputFormat::Text => {
                    print_findings(&endpoint, &findings);
                    if explain {
                        print_explanation(&signatures, &endpoint, &resp);
                    }
                }
            }

            Ok(if findings.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FINDINGS)
            })
        }
    }
}

fn load_signatures(path: &Path) -> anyhow::Result<SignatureSet> {
    SignatureSet::from_file(path)
        .with_context(|| format!("failed to load signatures from {}", path.display()))
}

fn load_response(path: &Path) -> anyhow::Result<HttpResponse> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read response {}", path.display()))?;

    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let resp = if is_yaml {
        serde_yaml::from_str(&content).context("invalid YAML response")?
    } else {
        serde_json::from_str(&content).context("invalid JSON response")?
    };
    debug!(path = %path.display(), "Loaded captured response");
    Ok(resp)
}

/// Outcome of linting one signatures file.
#[derive(Debug, Default, Serialize)]
struct LintSummary {
    file: PathBuf,
    valid: bool,
    plugins: usize,
    checks: usize,
    by_severity: BTreeMap<Severity, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LintSummary {
    fn from_result(file: &Path, result: Result<SignatureSet, sigscan_core::LoadError>) -> Self {
        match result {
            Ok(set) => {
                let mut by_severity = BTreeMap::new();
                for (_, check) in set.checks() {
                    if let Ok(severity) = Severity::parse(check.severity()) {
                        *by_severity.entry(severity).or_insert(0) += 1;
                    }
                }
                Self {
                    file: file.to_path_buf(),
                    valid: true,
                    plugins: set.plugins().len(),
                    checks: set.checks().count(),
                    by_severity,
                    error: None,
                }
            }
            Err(e) => Self {
                file: file.to_path_buf(),
                error: Some(e.to_string()),
                ..Self::default()
            },
        }
    }
}

fn lint(path: &Path, output: OutputFormat) -> ExitCode {
    let summary = LintSummary::from_result(path, SignatureSet::from_file(path));

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{RED}Error serializing summary: {e}{RESET}"),
        },
        OutputFormat::Text => print_lint_summary(&summary),
    }

    if summary.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FINDINGS)
    }
}

fn print_lint_summary(summary: &LintSummary) {
    println!("{BOLD}{CYAN}Signature Linter{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("{DIM}File:{RESET}     {CYAN}{}{RESET}\n", summary.file.display());

    if let Some(error) = &summary.error {
        println!("{RED}FAIL{RESET} {error}");
        println!();
        println!("{RED}{BOLD}Linting failed with errors{RESET}");
        return;
    }

    println!("  {DIM}Plugins:{RESET}  {BOLD}{}{RESET}", summary.plugins);
    println!("  {DIM}Checks:{RESET}   {BOLD}{}{RESET}", summary.checks);
    for severity in Severity::ALL.iter().rev() {
        let count = summary.by_severity.get(severity).copied().unwrap_or(0);
        if count > 0 {
            println!(
                "    {}{:<13}{RESET} {count}",
                severity_color(*severity),
                severity.as_str()
            );
        }
    }
    println!();
    println!("{GREEN}{BOLD}All checks passed!{RESET}");
}

fn list(signatures: &SignatureSet, severity: &str, output: OutputFormat) -> anyhow::Result<()> {
    let rows = signatures.report_rows(severity);
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => print!("{}", ReportTable::new(rows)),
    }
    Ok(())
}

fn print_findings(endpoint: &str, findings: &[Finding]) {
    if findings.is_empty() {
        println!("{GREEN}{BOLD}No findings for {endpoint}{RESET}");
        return;
    }

    println!("{RED}{BOLD}{} finding(s) for {endpoint}{RESET}", findings.len());
    for finding in findings {
        let color = Severity::parse(&finding.severity)
            .map(severity_color)
            .unwrap_or(CYAN);
        println!(
            "  {color}|{RESET} {BOLD}{}{RESET} {DIM}[{RESET}{color}{}{RESET}{DIM}]{RESET}: {}",
            finding.check, finding.severity, finding.description
        );
        println!("  {color}|{RESET}   {GREEN}-> {}{RESET}", finding.remediation);
    }
}

fn print_explanation(signatures: &SignatureSet, endpoint: &str, resp: &HttpResponse) {
    println!();
    println!("{DIM}Non-matching checks:{RESET}");
    for plugin in signatures.plugins().iter().filter(|p| p.targets(endpoint)) {
        for check in plugin.checks() {
            match check.first_mismatch(resp) {
                Ok(Some(stage)) => println!(
                    "  {DIM}-{RESET} {} {DIM}stopped at{RESET} {YELLOW}{stage}{RESET}",
                    check.name()
                ),
                Ok(None) => {}
                Err(e) => println!("  {RED}-{RESET} {} {RED}{e}{RESET}", check.name()),
            }
        }
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => RED,
        Severity::Medium => YELLOW,
        Severity::Low | Severity::Informational => CYAN,
    }
}
