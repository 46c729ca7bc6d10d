use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use grapheq::config::{Backend, Semantics, VerifyOptions};
use grapheq::cypher_parser;
use grapheq::graph_catalog::{infer_sdt, GraphSchema};
use grapheq::sql_ir::ToSql;
use grapheq::transpiler;
use grapheq::verifier::{self, VerifyRequest};

/// grapheq - prove or refute that a SQL translation preserves a Cypher query
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check one Cypher/SQL pair for bounded equivalence
    Check {
        /// Cypher query text
        cypher: String,
        /// Candidate SQL translation
        sql: String,
        /// Path to the graph schema JSON file
        #[arg(long)]
        schema: PathBuf,
        /// Largest database bound to try
        #[arg(long)]
        bound_max: Option<u32>,
        /// Wall-clock budget in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Result semantics: bag, list or set
        #[arg(long)]
        semantics: Option<String>,
        /// Verifier backend: symbolic or normalize
        #[arg(long)]
        backend: Option<String>,
        /// Solver command line (default `z3 -in`, or $GRAPHEQ_SOLVER)
        #[arg(long)]
        solver: Option<String>,
        /// Skip PK/FK integrity constraints
        #[arg(long)]
        no_integrity: bool,
    },
    /// Print the canonical SQL transpilation of a Cypher query
    Transpile {
        cypher: String,
        #[arg(long)]
        schema: PathBuf,
    },
    /// Print the induced relational schema and SDT for a graph schema
    Infer {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Verify a JSONL file of requests, one report per line
    Batch {
        /// File with one JSON verify-request per line
        file: PathBuf,
        /// Maximum workers in flight
        #[arg(long, default_value_t = 4)]
        jobs: usize,
        #[arg(long)]
        bound_max: Option<u32>,
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn parse_semantics(text: &str) -> Result<Semantics> {
    match text.to_ascii_lowercase().as_str() {
        "bag" => Ok(Semantics::Bag),
        "list" => Ok(Semantics::List),
        "set" => Ok(Semantics::Set),
        other => anyhow::bail!("unknown semantics `{}` (expected bag, list or set)", other),
    }
}

fn parse_backend(text: &str) -> Result<Backend> {
    match text.to_ascii_lowercase().as_str() {
        "symbolic" => Ok(Backend::Symbolic),
        "normalize" => Ok(Backend::Normalize),
        other => anyhow::bail!(
            "unknown backend `{}` (expected symbolic or normalize)",
            other
        ),
    }
}

fn load_schema(path: &PathBuf) -> Result<GraphSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema file {}", path.display()))?;
    GraphSchema::from_json(&text).map_err(|e| anyhow::anyhow!(e))
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Check {
            cypher,
            sql,
            schema,
            bound_max,
            timeout,
            semantics,
            backend,
            solver,
            no_integrity,
        } => {
            let schema = load_schema(&schema)?;
            let mut options = VerifyOptions::default();
            if let Some(semantics) = semantics.as_deref() {
                options.semantics = parse_semantics(semantics)?;
            }
            if let Some(backend) = backend.as_deref() {
                options.backend = parse_backend(backend)?;
            }
            if let Some(solver) = solver {
                options.solver_command = solver;
            }
            if no_integrity {
                options.integrity_constraints = false;
            }
            let request = VerifyRequest {
                cypher,
                sql,
                schema,
                bound_max,
                timeout,
                semantics: None,
                backend: None,
            };
            let report = verifier::verify_request(options, request).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(report.result.exit_code())
        }
        Command::Transpile { cypher, schema } => {
            let schema = load_schema(&schema)?;
            let induced = infer_sdt(&schema).map_err(|e| anyhow::anyhow!(e))?;
            let cleaned = cypher_parser::strip_comments(&cypher);
            let query =
                cypher_parser::parse_query(&cleaned).map_err(|e| anyhow::anyhow!(e))?;
            let ir = transpiler::transpile(&query, &induced.sdt, &induced.schema)
                .map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", ir.to_sql());
            Ok(0)
        }
        Command::Infer { schema } => {
            let schema = load_schema(&schema)?;
            let induced = infer_sdt(&schema).map_err(|e| anyhow::anyhow!(e))?;
            let output = serde_json::json!({
                "schema": induced.schema,
                "sdt": induced.sdt,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(0)
        }
        Command::Batch {
            file,
            jobs,
            bound_max,
            timeout,
        } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading batch file {}", file.display()))?;
            let mut options = VerifyOptions::default();
            if let Some(bound_max) = bound_max {
                options.bound_max = bound_max;
            }
            if let Some(timeout) = timeout {
                options.timeout_secs = timeout;
            }
            let mut requests = Vec::new();
            for (line_no, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let request: VerifyRequest = serde_json::from_str(line)
                    .with_context(|| format!("parsing request on line {}", line_no + 1))?;
                requests.push(request);
            }
            let reports = verifier::verify_batch(options, requests, jobs).await;
            for report in &reports {
                println!("{}", serde_json::to_string(report)?);
            }
            Ok(0)
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            64
        }
    };
    std::process::exit(code);
}
