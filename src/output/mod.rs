// Output formatting: result tables, terminal messages, JSON envelopes

use crate::coverage::{Criterion, Path};
use crate::error::CoverageError;
use is_terminal::IsTerminal;
use std::fmt::Write;

// Colors for terminal output (when supported)
pub const RED: &str = "\x1b[0;31m";
pub const YELLOW: &str = "\x1b[1;33m";
pub const CYAN: &str = "\x1b[0;36m";
pub const BOLD: &str = "\x1b[1m";
pub const NC: &str = "\x1b[0m"; // No Color

/// Arrow placed between path elements in tables
pub const PATH_ARROW: &str = " → ";

/// Check if stdout is a terminal (for color output)
#[inline]
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Print progress message to stderr so tables on stdout stay clean
pub fn progress(msg: &str) {
    let color = if is_terminal() { CYAN } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    eprintln!("{}[....]{} {}", color, reset, msg);
}

/// Print warning message
pub fn warn(msg: &str) {
    let color = if is_terminal() { YELLOW } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    eprintln!("{}[WARN]{} {}", color, reset, msg);
}

/// Print remediation hint to stderr, next to the error it explains
pub fn hint(msg: &str) {
    let color = if is_terminal() { CYAN } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    eprintln!("{}[HINT]{} {}", color, reset, msg);
}

/// Print error message
pub fn error(msg: &str) {
    let color = if is_terminal() { RED } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    eprintln!("{}[ERROR]{} {}", color, reset, msg);
}

/// Print section header
pub fn header(msg: &str) {
    let bold = if is_terminal() { BOLD } else { "" };
    let reset = if is_terminal() { NC } else { "" };
    println!("{}===>{} {}", bold, reset, msg);
    println!();
}

/// Exit codes
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_FILE_NOT_FOUND: i32 = 4;
pub const EXIT_VALIDATION: i32 = 5;
pub const EXIT_ITERATION_LIMIT: i32 = 7;

/// Exit with file not found error
pub fn exit_file_not_found(path: &str) -> ! {
    error(&format!("File not found: {}", path));
    std::process::exit(EXIT_FILE_NOT_FOUND);
}

/// Exit code for a computation error
pub fn exit_code_for(err: &CoverageError) -> i32 {
    match err {
        CoverageError::MalformedInput { .. } => EXIT_VALIDATION,
        CoverageError::IterationLimitExceeded { .. } => EXIT_ITERATION_LIMIT,
    }
}

// ============================================================================
// Result Tables
// ============================================================================

/// Render paths as a `Num / Len / Path` table
///
/// Returns `None` for an empty list so callers can print their own
/// "nothing found" message.
pub fn format_table(paths: &[Path]) -> Option<String> {
    if paths.is_empty() {
        return None;
    }

    let mut out = String::from("Num\tLen\tPath\n");
    for (idx, path) in paths.iter().enumerate() {
        let flow: Vec<&str> = path.iter().collect();
        writeln!(out, "{:3}\t{:3}\t{}", idx + 1, path.len(), flow.join(PATH_ARROW)).ok();
    }
    Some(out)
}

/// Headline printed above a result table
pub fn results_heading(criterion: Criterion, count: usize) -> String {
    format!("Found a total of {} {}:", count, criterion)
}

/// Message printed instead of an empty table
pub fn no_results(criterion: Criterion) -> String {
    format!("No {} found.", criterion)
}

// ============================================================================
// Error Codes and Remediation
// ============================================================================

/// Error codes for JSON error responses
pub const E_INVALID_INPUT: &str = "E001";
pub const E_ITERATION_LIMIT: &str = "E002";
pub const E_FILE_NOT_FOUND: &str = "E003";
pub const E_IO: &str = "E004";

/// Common remediation messages
pub const R_HINT_MAX_ITERATIONS: &str = "Use --max-iterations N to raise the round cap, or --no-limit to remove it";
pub const R_HINT_INPUT_FORMAT: &str = "Each line is 'node' or 'node neighbor1 neighbor2 ...'; lines starting with '#' are ignored";

/// JSON output wrapper
#[derive(Debug, Clone, serde::Serialize)]
pub struct JsonResponse<T> {
    pub schema_version: String,
    pub execution_id: String,
    pub tool: String,
    pub timestamp: String,
    pub data: T,
}

impl<T: serde::Serialize> JsonResponse<T> {
    pub fn new(data: T) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let timestamp = chrono::Utc::now().to_rfc3339();
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let exec_id = format!("{:x}-{}", secs, std::process::id());

        JsonResponse {
            schema_version: "1.0.0".to_string(),
            execution_id: exec_id,
            tool: "pathcov".to_string(),
            timestamp,
            data,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Error response format for JSON mode
#[derive(Debug, Clone, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl JsonError {
    pub fn new(category: &str, message: &str, code: &str) -> Self {
        JsonError {
            error: category.to_string(),
            message: message.to_string(),
            code: code.to_string(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, remediation: &str) -> Self {
        self.remediation = Some(remediation.to_string());
        self
    }

    /// Input file missing
    pub fn file_not_found(path: &str) -> Self {
        Self::new(
            "FileNotFound",
            &format!("File not found: {}", path),
            E_FILE_NOT_FOUND,
        )
    }

    /// Input could not be read
    pub fn io(message: &str) -> Self {
        Self::new("IoError", message, E_IO)
    }
}

impl From<&CoverageError> for JsonError {
    fn from(err: &CoverageError) -> Self {
        match err {
            CoverageError::MalformedInput { .. } => {
                JsonError::new("MalformedInput", &err.to_string(), E_INVALID_INPUT)
                    .with_remediation(R_HINT_INPUT_FORMAT)
            }
            CoverageError::IterationLimitExceeded { .. } => {
                JsonError::new("IterationLimitExceeded", &err.to_string(), E_ITERATION_LIMIT)
                    .with_remediation(R_HINT_MAX_ITERATIONS)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(nodes: &[&str]) -> Path {
        Path::new(nodes.iter().map(|n| n.to_string()).collect())
    }

    #[test]
    fn test_json_response() {
        let data = vec!["item1", "item2"];
        let response = JsonResponse::new(data);
        let json = response.to_json();
        assert!(json.contains("\"tool\":\"pathcov\""));
        assert!(json.contains("\"data\":[\"item1\",\"item2\"]"));
    }

    #[test]
    fn test_format_table() {
        let paths = vec![path(&["a", "b"]), path(&["b", "c", "a"])];
        let table = format_table(&paths).unwrap();

        assert_eq!(
            table,
            "Num\tLen\tPath\n  1\t  2\ta → b\n  2\t  3\tb → c → a\n"
        );
    }

    #[test]
    fn test_format_table_empty() {
        assert!(format_table(&[]).is_none());
        assert_eq!(no_results(Criterion::PrimePaths), "No prime paths found.");
    }

    #[test]
    fn test_results_heading() {
        assert_eq!(
            results_heading(Criterion::EdgePairs, 2),
            "Found a total of 2 edge pairs:"
        );
    }

    #[test]
    fn test_json_error_from_coverage_error() {
        let err = CoverageError::IterationLimitExceeded {
            criterion: Criterion::PrimePaths,
            limit: 3,
        };
        let json = JsonError::from(&err);

        assert_eq!(json.code, E_ITERATION_LIMIT);
        assert_eq!(json.error, "IterationLimitExceeded");
        assert!(json.remediation.is_some());
        assert_eq!(exit_code_for(&err), EXIT_ITERATION_LIMIT);
    }

    #[test]
    fn test_json_error_skips_missing_remediation() {
        let json = serde_json::to_string(&JsonError::file_not_found("x.txt")).unwrap();
        assert!(!json.contains("remediation"));
        assert!(json.contains("E003"));
    }
}
