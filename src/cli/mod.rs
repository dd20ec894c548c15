// CLI command definitions and handlers

use crate::coverage::{Criterion, CoverageLimits, DEFAULT_MAX_ITERATIONS};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pathcov - structural coverage requirements for directed graphs
///
/// Computes prime paths and edge-pairs over a graph given as text.
#[derive(Parser, Debug, Clone)]
#[command(name = "pathcov")]
#[command(author, version, about)]
#[command(long_about = "Pathcov computes structural test requirements over a directed graph.

Input is one line per node: 'node' declares a node, 'node nb1 nb2 ...' adds an
edge from node to each neighbor. Lines starting with '#' are ignored.

Criteria:
  - prime paths: maximal simple paths (cycles may close at their start)
  - edge pairs:  every walk of two consecutive edges")]
pub struct Cli {
    /// Output format
    #[arg(global = true, long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Human,
    /// Compact JSON for programmatic consumption
    Json,
    /// Formatted JSON with indentation
    Pretty,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute prime paths
    Prime(ComputeArgs),

    /// Compute edge-pairs
    EdgePairs(ComputeArgs),

    /// Show graph statistics
    Graph(GraphArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ComputeArgs {
    /// Graph file (reads stdin when omitted or "-")
    pub input: Option<PathBuf>,

    /// Round cap before giving up (at least 1)
    #[arg(
        long,
        env = "PATHCOV_MAX_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_iterations: usize,

    /// Disable the round cap
    #[arg(long)]
    pub no_limit: bool,

    /// Print a step-by-step account of every decision
    #[arg(long)]
    pub narrate: bool,

    /// Suppress per-round progress messages
    #[arg(short, long)]
    pub quiet: bool,
}

impl ComputeArgs {
    pub fn limits(&self) -> CoverageLimits {
        if self.no_limit {
            CoverageLimits::unbounded()
        } else {
            CoverageLimits::new(self.max_iterations)
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Graph file (reads stdin when omitted or "-")
    pub input: Option<PathBuf>,

    /// Print the graph back in normalized line format
    #[arg(long)]
    pub normalized: bool,
}

impl Commands {
    pub fn criterion(&self) -> Option<Criterion> {
        match self {
            Commands::Prime(_) => Some(Criterion::PrimePaths),
            Commands::EdgePairs(_) => Some(Criterion::EdgePairs),
            Commands::Graph(_) => None,
        }
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

pub mod cmds {
    use super::*;
    use crate::coverage::{
        uncovered_edges, ComputationState, Narrative, Path, ProgressReporter,
    };
    use crate::error::CoverageError;
    use crate::graph::{parse_graph, to_text, Graph, GraphSummary};
    use crate::output::{self, JsonError, JsonResponse};
    use anyhow::{Context, Result};
    use serde::Serialize;
    use std::io::Read;
    use std::path::Path as FsPath;

    /// Result of a `prime` or `edge-pairs` run in JSON mode
    #[derive(Debug, Clone, Serialize)]
    pub struct ComputeReport {
        pub criterion: Criterion,
        pub max_iterations: Option<usize>,
        pub rounds: usize,
        pub count: usize,
        pub paths: Vec<Path>,
        /// Graph edges no returned path traverses
        pub uncovered_edges: Vec<(String, String)>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub narrative: Option<String>,
    }

    pub fn prime(args: ComputeArgs, cli: &Cli) -> Result<()> {
        compute(Criterion::PrimePaths, args, cli)
    }

    pub fn edge_pairs(args: ComputeArgs, cli: &Cli) -> Result<()> {
        compute(Criterion::EdgePairs, args, cli)
    }

    pub fn graph(args: GraphArgs, cli: &Cli) -> Result<()> {
        let graph = load_graph(args.input.as_deref(), cli.output)?;
        let summary = graph.summary();

        match cli.output {
            OutputFormat::Human => {
                print_summary(&summary);
                if args.normalized {
                    println!();
                    print!("{}", to_text(&graph));
                }
            }
            OutputFormat::Json => println!("{}", JsonResponse::new(summary).to_json()),
            OutputFormat::Pretty => println!("{}", JsonResponse::new(summary).to_pretty_json()),
        }
        Ok(())
    }

    fn compute(criterion: Criterion, args: ComputeArgs, cli: &Cli) -> Result<()> {
        let graph = load_graph(args.input.as_deref(), cli.output)?;
        let limits = args.limits();
        let show_progress = cli.output == OutputFormat::Human && !args.quiet;

        tracing::debug!(%criterion, nodes = graph.node_count(), edges = graph.edge_count(), "starting computation");

        let reporter = ProgressReporter::with_sink(|line: &str| {
            if show_progress {
                output::progress(line);
            }
        });
        let narrative = args.narrate.then(Narrative::new);
        let mut observers = (reporter, narrative);

        let mut state = ComputationState::new(&graph, criterion, limits);
        while !state.is_terminal() {
            if let Err(err) = state.step(&mut observers) {
                fail(&err, cli.output);
            }
        }

        let rounds = state.round();
        let paths = state.into_paths();
        let uncovered = uncovered_edges(&graph, &paths);
        let narrative = observers.1.map(Narrative::into_string);

        match cli.output {
            OutputFormat::Human => {
                if let Some(text) = &narrative {
                    println!("{}", text);
                }
                print_paths(criterion, &paths);
                if criterion == Criterion::PrimePaths && !uncovered.is_empty() {
                    output::warn(&format!("{} edge(s) not covered by any prime path", uncovered.len()));
                }
            }
            format => {
                let report = ComputeReport {
                    criterion,
                    max_iterations: limits.max_iterations,
                    rounds,
                    count: paths.len(),
                    paths,
                    uncovered_edges: uncovered,
                    narrative,
                };
                let response = JsonResponse::new(report);
                if format == OutputFormat::Pretty {
                    println!("{}", response.to_pretty_json());
                } else {
                    println!("{}", response.to_json());
                }
            }
        }
        Ok(())
    }

    fn print_paths(criterion: Criterion, paths: &[Path]) {
        match output::format_table(paths) {
            Some(table) => {
                println!("{}", output::results_heading(criterion, paths.len()));
                print!("{}", table);
            }
            None => println!("{}", output::no_results(criterion)),
        }
    }

    fn print_summary(summary: &GraphSummary) {
        output::header("Graph summary");
        println!("  nodes: {}", summary.nodes);
        println!("  edges: {}", summary.edges);
        println!("  sources: {}", summary.sources);
        println!("  sinks: {}", summary.sinks);
        println!("  self_loops: {}", summary.self_loops);
        println!("  cyclic_components: {}", summary.cyclic_components);
        println!("  cyclic: {}", if summary.is_cyclic { "yes" } else { "no" });
    }

    /// Read graph text from a file, or stdin when `input` is absent or "-"
    pub fn read_input(input: Option<&FsPath>) -> Result<String> {
        match input {
            Some(path) if path != FsPath::new("-") => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            _ => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read graph from stdin")?;
                Ok(text)
            }
        }
    }

    fn load_graph(input: Option<&FsPath>, format: OutputFormat) -> Result<Graph> {
        if let Some(path) = input {
            if path != FsPath::new("-") && !path.exists() {
                let shown = path.display().to_string();
                if format == OutputFormat::Human {
                    output::exit_file_not_found(&shown);
                }
                println!("{}", JsonResponse::new(JsonError::file_not_found(&shown)).to_json());
                std::process::exit(output::EXIT_FILE_NOT_FOUND);
            }
        }

        let text = match read_input(input) {
            Ok(text) => text,
            Err(e) if format != OutputFormat::Human => {
                println!("{}", JsonResponse::new(JsonError::io(&format!("{:#}", e))).to_json());
                std::process::exit(output::EXIT_ERROR);
            }
            Err(e) => return Err(e),
        };

        match parse_graph(&text) {
            Ok(graph) => Ok(graph),
            Err(err) => fail(&err, format),
        }
    }

    /// Report a computation error and exit with its code
    fn fail(err: &CoverageError, format: OutputFormat) -> ! {
        let json = JsonError::from(err);
        match format {
            OutputFormat::Human => {
                output::error(&err.to_string());
                if let Some(hint) = &json.remediation {
                    output::hint(hint);
                }
            }
            OutputFormat::Json => println!("{}", JsonResponse::new(json).to_json()),
            OutputFormat::Pretty => println!("{}", JsonResponse::new(json).to_pretty_json()),
        }
        std::process::exit(output::exit_code_for(err));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prime_defaults() {
        let cli = Cli::try_parse_from(["pathcov", "prime", "graph.txt"]).unwrap();

        assert_eq!(cli.output, OutputFormat::Human);
        match cli.command {
            Commands::Prime(args) => {
                assert_eq!(args.input, Some(PathBuf::from("graph.txt")));
                assert_eq!(args.limits(), CoverageLimits::default());
                assert!(!args.narrate);
                assert!(!args.quiet);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_edge_pairs_with_options() {
        let cli = Cli::try_parse_from([
            "pathcov",
            "--output",
            "json",
            "edge-pairs",
            "--max-iterations",
            "7",
            "--quiet",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.command.criterion(), Some(Criterion::EdgePairs));
        match cli.command {
            Commands::EdgePairs(args) => {
                assert!(args.input.is_none());
                assert_eq!(args.limits(), CoverageLimits::new(7));
                assert!(args.quiet);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_limit_overrides_cap() {
        let cli = Cli::try_parse_from(["pathcov", "prime", "--no-limit", "--max-iterations", "3"]).unwrap();
        match cli.command {
            Commands::Prime(args) => assert_eq!(args.limits(), CoverageLimits::unbounded()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_max_iterations_rejected() {
        let err = Cli::try_parse_from(["pathcov", "prime", "--max-iterations", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        assert!(Cli::try_parse_from(["pathcov", "prime", "--max-iterations", "1"]).is_ok());
    }

    #[test]
    fn test_output_flag_is_global() {
        let cli = Cli::try_parse_from(["pathcov", "graph", "g.txt", "--output", "pretty"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Pretty);
        assert_eq!(cli.command.criterion(), None);
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("g.txt");
        std::fs::write(&path, "a b\n").unwrap();

        assert_eq!(cmds::read_input(Some(&path)).unwrap(), "a b\n");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = cmds::read_input(Some(std::path::Path::new("/nonexistent/graph.txt"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read"));
    }
}
