//! Mock definition linter CLI
//!
//! Validates mock definition documents (JSON or YAML) before they are turned
//! into stub-server mappings.
//!
//! Usage:
//!   wiresmith-lint <directory_or_file> [OPTIONS]

use clap::Parser;
use std::path::PathBuf;
use wiresmith_core::{lint_directory, lint_file, LintReport, Severity, ValidationError};

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Mock definition linter
#[derive(Parser, Debug)]
#[command(name = "wiresmith-lint")]
#[command(author, version, about = "Validate mock definition documents")]
struct Args {
    /// Path to a document or a directory of documents
    #[arg(required = true)]
    path: PathBuf,

    /// Output format: text (default), json
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Only show errors (hide warnings)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();

    let report = if args.path.is_dir() {
        lint_directory(&args.path)
    } else {
        lint_file(&args.path)
    };

    if args.output == "json" {
        print_report_json(&report);
    } else {
        print_report(&report, &args);
    }

    std::process::exit(if report.passed(args.strict) { 0 } else { 1 });
}

fn print_report_json(report: &LintReport) {
    match serde_json::to_string_pretty(report) {
        Ok(output) => println!("{output}"),
        Err(e) => eprintln!("{RED}Failed to serialize report: {e}{RESET}"),
    }
}

fn print_report(report: &LintReport, args: &Args) {
    println!("{BOLD}{CYAN}Mock Definition Linter{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("{DIM}Scanning:{RESET} {CYAN}{}{RESET}", args.path.display());
    println!(
        "{DIM}Found:{RESET}    {BOLD}{}{RESET} document(s)\n",
        report.files_checked
    );

    if report.files_checked == 0 {
        println!("{YELLOW}Warning:{RESET} No JSON or YAML files found");
    }

    for file in &report.files {
        let result = &file.result;
        let issues: Vec<&ValidationError> = result
            .issues()
            .filter(|i| !args.errors_only || i.severity == Severity::Error)
            .collect();

        let file_name = file
            .file
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();

        if issues.is_empty() {
            println!("{GREEN}PASS{RESET} {BOLD}{CYAN}{file_name}{RESET}");
            continue;
        }

        let status = if result.has_errors() {
            format!("{RED}FAIL{RESET}")
        } else {
            format!("{YELLOW}WARN{RESET}")
        };
        println!(
            "{status} {BOLD}{CYAN}{file_name}{RESET} {DIM}({}){RESET}",
            result.summary()
        );

        for issue in issues {
            let color = severity_color(issue.severity);
            println!(
                "  {color}|{RESET} {DIM}[{RESET}{CYAN}{}{RESET}{DIM}]{RESET} {BOLD}{color}{}{RESET}: {}",
                issue.path,
                issue.severity.label(),
                issue.message
            );
        }
        println!();
    }

    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("{BOLD}{CYAN}Summary{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!(
        "  {DIM}Files checked:{RESET} {BOLD}{}{RESET}",
        report.files_checked
    );

    if report.errors > 0 {
        println!("  {RED}Errors:{RESET}    {BOLD}{RED}{}{RESET}", report.errors);
    } else {
        println!("  {GREEN}Errors:{RESET}    {BOLD}{GREEN}0{RESET}");
    }

    if report.warnings > 0 {
        println!(
            "  {YELLOW}Warnings:{RESET}  {BOLD}{YELLOW}{}{RESET}",
            report.warnings
        );
    } else {
        println!("  {DIM}Warnings:{RESET}  {BOLD}0{RESET}");
    }

    println!();

    if report.passed(args.strict) {
        if report.has_warnings() {
            println!("{YELLOW}{BOLD}Passed with warnings{RESET}");
        } else {
            println!("{GREEN}{BOLD}All checks passed!{RESET}");
        }
    } else if report.has_errors() {
        println!("{RED}{BOLD}Linting failed with errors{RESET}");
    } else {
        println!("{RED}{BOLD}Linting failed: warnings are errors in strict mode{RESET}");
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
    }
}
