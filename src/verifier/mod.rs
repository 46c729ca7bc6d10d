//! Verification orchestration: parse both queries, transpile the Cypher
//! side, run the bounded-search ladder against the solver, classify the
//! outcome, and render counterexamples.
//!
//! Within one call everything is single-threaded; parallelism happens per
//! request via [`verify_request`]/[`verify_batch`], which isolate each pair
//! on a blocking worker with a one-shot result channel and a wall-clock
//! budget. Cancellation works by deadline: the solver driver kills its
//! child process once the deadline passes.

pub mod counterexample;
pub mod normalize;
pub mod report;

pub use report::{Report, TimeSplit, Verdict, VerifyRequest};

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use serde_json::Value;
use validator::Validate;

use crate::config::{Backend, VerifyOptions};
use crate::cypher_parser::{self, CypherParseError};
use crate::encoder::{encode_pair, EncodeError, EncodeOutcome, EncodedPair};
use crate::graph_catalog::{infer_sdt, GraphSchema, RelationalSchema};
use crate::solver::{assert_line, SmtResult, SmtSolver, SolverError, Term};
use crate::sql_ir::{Sql, ToSql};
use crate::sql_parser;
use crate::transpiler;

enum BoundOutcome {
    Equivalent,
    NotEquivalent(String),
    Unknown,
}

pub struct Verifier {
    options: VerifyOptions,
}

impl Verifier {
    pub fn new(options: VerifyOptions) -> Result<Self, validator::ValidationErrors> {
        options.validate()?;
        Ok(Verifier { options })
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify one pair synchronously. Never panics on user input; every
    /// failure mode maps to a verdict.
    pub fn verify(&self, cypher_text: &str, sql_text: &str, schema: &GraphSchema) -> Report {
        let start = Instant::now();
        let deadline = start + Duration::from_secs(self.options.timeout_secs);
        let mut report = self.run(cypher_text, sql_text, schema, start, deadline);
        report.time_ms = start.elapsed().as_millis() as u64;
        report
            .details
            .entry("backend".to_string())
            .or_insert_with(|| {
                Value::String(
                    match self.options.backend {
                        Backend::Symbolic => "symbolic",
                        Backend::Normalize => "normalize",
                    }
                    .to_string(),
                )
            });
        report
    }

    fn run(
        &self,
        cypher_text: &str,
        sql_text: &str,
        schema: &GraphSchema,
        start: Instant,
        deadline: Instant,
    ) -> Report {
        let induced = match infer_sdt(schema) {
            Ok(induced) => induced,
            Err(e) => {
                return Report::new(Verdict::SyntaxError)
                    .with_detail("stage", "schema")
                    .with_detail("error", e.to_string())
            }
        };

        let cleaned_cypher = cypher_parser::strip_comments(cypher_text);
        let query = match cypher_parser::parse_query(&cleaned_cypher) {
            Ok(query) => query,
            Err(CypherParseError::NotSupported { feature }) => {
                return Report::new(Verdict::NotSupported)
                    .with_detail("stage", "cypher-parse")
                    .with_detail("error", feature)
            }
            Err(e) => {
                return Report::new(Verdict::SyntaxError)
                    .with_detail("stage", "cypher-parse")
                    .with_detail("error", e.to_string())
            }
        };

        let left_ir = match transpiler::transpile(&query, &induced.sdt, &induced.schema) {
            Ok(ir) => ir,
            Err(e) => {
                return Report::new(Verdict::SyntaxError)
                    .with_detail("stage", "transpile")
                    .with_detail("error", e.to_string())
            }
        };

        let cleaned_sql = cypher_parser::strip_comments(sql_text);
        let right_ir = match sql_parser::parse_sql(&cleaned_sql) {
            Ok(ir) => ir,
            Err(e) => {
                return Report::new(Verdict::SyntaxError)
                    .with_detail("stage", "sql-parse")
                    .with_detail("error", e.to_string())
            }
        };

        let traversing_ms = start.elapsed().as_millis() as u64;

        if self.options.backend == Backend::Normalize {
            let mut report = normalize::verify_normalized(&left_ir.to_sql(), &cleaned_sql);
            report.times.traversing_ms = traversing_ms;
            return report;
        }

        self.run_ladder(&induced.schema, &left_ir, &right_ir, deadline, traversing_ms)
    }

    /// The bounded-search ladder: k = 1, 2, … up to `bound_max`. Only an
    /// `Equivalent` outcome at bound k continues to k+1.
    fn run_ladder(
        &self,
        schema: &RelationalSchema,
        left_ir: &Sql,
        right_ir: &Sql,
        deadline: Instant,
        traversing_ms: u64,
    ) -> Report {
        let printed_left = left_ir.to_sql();
        let printed_right = right_ir.to_sql();

        let mut times = TimeSplit {
            traversing_ms,
            ..TimeSplit::default()
        };
        let mut last_passed: Option<u32> = None;

        let finish = |mut report: Report, times: TimeSplit| -> Report {
            report.times = times;
            report
        };

        for bound in 1..=self.options.bound_max {
            if Instant::now() >= deadline {
                let mut report = Report::new(Verdict::Timeout);
                report.checked_bound = last_passed;
                return finish(report, times);
            }
            info!("verifying at bound {}", bound);

            let encode_start = Instant::now();
            let outcome = match encode_pair(schema, left_ir, right_ir, bound as usize, &self.options)
            {
                Ok(outcome) => outcome,
                Err(EncodeError::NotSupported { feature }) => {
                    return finish(
                        Report::new(Verdict::NotSupported)
                            .with_detail("stage", "encode")
                            .with_detail("error", feature),
                        times,
                    )
                }
                Err(EncodeError::Internal { message }) => {
                    warn!("internal encoder error: {}", message);
                    return finish(
                        Report::new(Verdict::Unknown)
                            .with_detail("stage", "encode")
                            .with_detail("internal_error", message),
                        times,
                    );
                }
                Err(e) => {
                    return finish(
                        Report::new(Verdict::SyntaxError)
                            .with_detail("stage", "encode")
                            .with_detail("error", e.to_string()),
                        times,
                    )
                }
            };
            times.encoding_ms += encode_start.elapsed().as_millis() as u64;

            let pair = match outcome {
                EncodeOutcome::Encoded(pair) => pair,
                EncodeOutcome::ArityMismatch { left, right } => {
                    // Different output widths can never be equivalent.
                    return finish(
                        Report::new(Verdict::NotEquivalent)
                            .with_detail("error", "different number of output columns")
                            .with_detail("left_columns", left as u64)
                            .with_detail("right_columns", right as u64),
                        times,
                    );
                }
            };

            let solve_start = Instant::now();
            let solved = self.solve_bound(&pair, schema, &printed_left, &printed_right, deadline);
            times.solving_ms += solve_start.elapsed().as_millis() as u64;

            match solved {
                Ok(BoundOutcome::Equivalent) => {
                    last_passed = Some(bound);
                }
                Ok(BoundOutcome::NotEquivalent(cex)) => {
                    let mut report = Report::new(Verdict::NotEquivalent);
                    report.checked_bound = Some(bound);
                    report.counterexample = Some(cex);
                    return finish(report, times);
                }
                Ok(BoundOutcome::Unknown) => {
                    let mut report = Report::new(Verdict::Unknown);
                    report.checked_bound = last_passed;
                    return finish(report, times);
                }
                Err(SolverError::Timeout) => {
                    let mut report = Report::new(Verdict::Timeout);
                    report.checked_bound = last_passed;
                    return finish(report, times);
                }
                Err(e) => {
                    warn!("solver failure: {}", e);
                    let mut report = Report::new(Verdict::Unknown)
                        .with_detail("stage", "solve")
                        .with_detail("solver_error", e.to_string());
                    report.checked_bound = last_passed;
                    return finish(report, times);
                }
            }
        }

        let mut report = Report::new(Verdict::Equivalent);
        report.checked_bound = Some(self.options.bound_max);
        finish(report, times)
    }

    /// One solver session: emit the script, assert the negated equivalence
    /// formula, check, and on `sat` pull a counterexample from the model.
    fn solve_bound(
        &self,
        pair: &EncodedPair,
        schema: &RelationalSchema,
        sql1: &str,
        sql2: &str,
        deadline: Instant,
    ) -> Result<BoundOutcome, SolverError> {
        let mut solver = SmtSolver::spawn(&self.options.solver_command)?;
        solver.set_deadline(Some(deadline));
        for line in pair.ctx.script_lines() {
            solver.send(&line)?;
        }
        solver.send(&assert_line(&Term::not(pair.formula.clone())))?;

        match solver.check_sat()? {
            SmtResult::Unsat => Ok(BoundOutcome::Equivalent),
            SmtResult::Unknown => Ok(BoundOutcome::Unknown),
            SmtResult::Sat => {
                let cex = counterexample::render_counterexample(
                    &mut solver,
                    pair,
                    schema,
                    sql1,
                    sql2,
                )?;
                Ok(BoundOutcome::NotEquivalent(cex))
            }
        }
    }
}

/// Run one request on an isolated blocking worker. The wall clock is
/// enforced twice: the solver deadline inside the worker, and a grace
/// timeout around the one-shot result channel out here.
pub async fn verify_request(base: VerifyOptions, request: VerifyRequest) -> Report {
    let options = request.options(&base);
    let grace = Duration::from_secs(options.timeout_secs.saturating_add(5));
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::task::spawn_blocking(move || {
        let report = match Verifier::new(options) {
            Ok(verifier) => verifier.verify(&request.cypher, &request.sql, &request.schema),
            Err(e) => Report::new(Verdict::SyntaxError)
                .with_detail("stage", "options")
                .with_detail("error", e.to_string()),
        };
        let _ = tx.send(report);
    });

    match tokio::time::timeout(grace, rx).await {
        Ok(Ok(report)) => report,
        _ => Report::new(Verdict::Timeout)
            .with_detail("error", "worker exceeded its wall-clock budget"),
    }
}

/// Verify many pairs with at most `jobs` workers in flight. Reports come
/// back in request order.
pub async fn verify_batch(
    base: VerifyOptions,
    requests: Vec<VerifyRequest>,
    jobs: usize,
) -> Vec<Report> {
    let total = requests.len();
    let semaphore = Arc::new(tokio::sync::Semaphore::new(jobs.max(1)));
    let mut set = tokio::task::JoinSet::new();

    for (idx, request) in requests.into_iter().enumerate() {
        let base = base.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore stays open");
            (idx, verify_request(base, request).await)
        });
    }

    let mut reports: Vec<Option<Report>> = (0..total).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        if let Ok((idx, report)) = joined {
            reports[idx] = Some(report);
        }
    }
    reports
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Report::new(Verdict::Unknown).with_detail("error", "worker panicked")
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_catalog::NodeType;

    fn person_schema() -> GraphSchema {
        let mut schema = GraphSchema::new();
        schema
            .add_node(NodeType::new(
                "Person",
                vec!["pid".into(), "name".into(), "age".into()],
            ))
            .unwrap();
        schema
    }

    #[test]
    fn test_cypher_syntax_error_verdict() {
        let verifier = Verifier::new(VerifyOptions::default()).unwrap();
        let report = verifier.verify("MATCH (p:Person", "SELECT pid FROM person", &person_schema());
        assert_eq!(report.result, Verdict::SyntaxError);
        assert_eq!(report.details["stage"], "cypher-parse");
    }

    #[test]
    fn test_sql_syntax_error_verdict() {
        let verifier = Verifier::new(VerifyOptions::default()).unwrap();
        let report = verifier.verify(
            "MATCH (p:Person) RETURN p.pid AS pid",
            "SELEC pid FROM person",
            &person_schema(),
        );
        assert_eq!(report.result, Verdict::SyntaxError);
        assert_eq!(report.details["stage"], "sql-parse");
    }

    #[test]
    fn test_variable_length_path_is_not_supported() {
        let verifier = Verifier::new(VerifyOptions::default()).unwrap();
        let mut schema = person_schema();
        schema
            .add_edge(crate::graph_catalog::EdgeType::new(
                "KNOWS",
                "Person",
                "Person",
                vec!["kid".into()],
            ))
            .unwrap();
        let report = verifier.verify(
            "MATCH (a:Person)-[k:KNOWS*1..3]->(b:Person) RETURN a.pid AS pid",
            "SELECT pid FROM person",
            &schema,
        );
        assert_eq!(report.result, Verdict::NotSupported);
    }

    #[test]
    fn test_normalize_backend_equivalent() {
        let options = VerifyOptions {
            backend: Backend::Normalize,
            ..VerifyOptions::default()
        };
        let verifier = Verifier::new(options).unwrap();
        let report = verifier.verify(
            "MATCH (p:Person) RETURN p.pid AS pid",
            "SELECT p.pid AS pid FROM person AS p",
            &person_schema(),
        );
        assert_eq!(report.result, Verdict::Equivalent);
        assert_eq!(report.details["backend"], "normalize");
    }

    #[test]
    fn test_normalize_backend_not_equivalent() {
        let options = VerifyOptions {
            backend: Backend::Normalize,
            ..VerifyOptions::default()
        };
        let verifier = Verifier::new(options).unwrap();
        let report = verifier.verify(
            "MATCH (p:Person) RETURN p.pid AS pid",
            "SELECT p.name AS name FROM person AS p",
            &person_schema(),
        );
        assert_eq!(report.result, Verdict::NotEquivalent);
    }

    #[test]
    fn test_arity_mismatch_is_not_equivalent_without_solving() {
        // Solver command points at nothing; the arity check fires first.
        let options = VerifyOptions {
            solver_command: "missing-solver-binary -in".to_string(),
            ..VerifyOptions::default()
        };
        let verifier = Verifier::new(options).unwrap();
        let report = verifier.verify(
            "MATCH (p:Person) RETURN p.pid AS pid, p.name AS name",
            "SELECT pid FROM person",
            &person_schema(),
        );
        assert_eq!(report.result, Verdict::NotEquivalent);
        assert_eq!(report.details["left_columns"], 2);
    }

    #[test]
    fn test_missing_solver_is_reported_not_panicked() {
        let options = VerifyOptions {
            solver_command: "missing-solver-binary -in".to_string(),
            ..VerifyOptions::default()
        };
        let verifier = Verifier::new(options).unwrap();
        let report = verifier.verify(
            "MATCH (p:Person) RETURN p.pid AS pid",
            "SELECT pid FROM person",
            &person_schema(),
        );
        assert_eq!(report.result, Verdict::Unknown);
        assert!(report.details.contains_key("solver_error"));
    }
}
