//! Full verification round-trips through a real solver. These run the
//! external `z3` binary and are ignored by default; run them with
//! `cargo test -- --ignored` on a machine with z3 on PATH.

use grapheq::config::VerifyOptions;
use grapheq::graph_catalog::{ColumnType, EdgeType, GraphSchema, NodeType};
use grapheq::verifier::{Verdict, Verifier};

fn person_schema() -> GraphSchema {
    let mut schema = GraphSchema::new();
    let mut person = NodeType::new(
        "Person",
        vec!["pid".into(), "name".into(), "age".into()],
    );
    person.types.insert("name".into(), ColumnType::Varchar);
    schema.add_node(person).unwrap();
    schema
}

fn graph_schema() -> GraphSchema {
    let mut schema = person_schema();
    schema
        .add_node(NodeType::new("Company", vec!["cid".into(), "title".into()]))
        .unwrap();
    schema
        .add_edge(EdgeType::new(
            "WORKS_AT",
            "Person",
            "Company",
            vec!["wid".into()],
        ))
        .unwrap();
    schema
}

fn verifier() -> Verifier {
    let options = VerifyOptions {
        bound_max: 2,
        timeout_secs: 120,
        ..VerifyOptions::default()
    };
    Verifier::new(options).unwrap()
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn canonical_transpilation_verifies_as_equivalent() {
    let report = verifier().verify(
        "MATCH (p:Person) WHERE p.age > 25 RETURN p.name AS name",
        "SELECT p.name AS name FROM person AS p WHERE p.age > 25",
        &person_schema(),
    );
    assert_eq!(report.result, Verdict::Equivalent, "{:?}", report.details);
    assert_eq!(report.checked_bound, Some(2));
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn different_filters_yield_a_counterexample() {
    let report = verifier().verify(
        "MATCH (n:Person) WHERE n.age > 25 RETURN n.name AS name",
        "SELECT name FROM person WHERE age > 30",
        &person_schema(),
    );
    assert_eq!(report.result, Verdict::NotEquivalent, "{:?}", report.details);
    let cex = report.counterexample.expect("counterexample rendered");
    assert!(cex.contains("CREATE TABLE person"));
    assert!(cex.contains("INSERT INTO person"));
    assert!(cex.contains("-- ----------sql1------------"));
    assert!(cex.contains("MATCH (n) DETACH DELETE n;"));
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn join_round_trip_is_equivalent() {
    let report = verifier().verify(
        "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid, c.cid AS cid",
        "SELECT p.pid AS pid, c.cid AS cid \
         FROM person AS p \
         INNER JOIN works_at AS w ON p.pid = w.SRC \
         INNER JOIN company AS c ON w.TGT = c.cid",
        &graph_schema(),
    );
    assert_eq!(report.result, Verdict::Equivalent, "{:?}", report.details);
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn join_direction_mistake_is_caught() {
    // The candidate SQL swaps SRC and TGT.
    let report = verifier().verify(
        "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid",
        "SELECT p.pid AS pid \
         FROM person AS p \
         INNER JOIN works_at AS w ON p.pid = w.TGT",
        &graph_schema(),
    );
    assert_eq!(report.result, Verdict::NotEquivalent, "{:?}", report.details);
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn count_aggregation_round_trip() {
    let report = verifier().verify(
        "MATCH (p:Person) RETURN p.age AS age, COUNT(*) AS n",
        "SELECT p.age AS age, COUNT(*) AS n FROM person AS p GROUP BY p.age",
        &person_schema(),
    );
    assert_eq!(report.result, Verdict::Equivalent, "{:?}", report.details);
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn union_all_vs_union_differ() {
    let report = verifier().verify(
        "MATCH (p:Person) RETURN p.age AS v UNION ALL MATCH (q:Person) RETURN q.age AS v",
        "SELECT age AS v FROM person UNION SELECT age AS v FROM person",
        &person_schema(),
    );
    assert_eq!(report.result, Verdict::NotEquivalent, "{:?}", report.details);
}

#[test]
#[ignore = "requires a z3 binary on PATH"]
fn timeout_reports_last_completed_bound() {
    let options = VerifyOptions {
        bound_max: 32,
        timeout_secs: 1,
        ..VerifyOptions::default()
    };
    let verifier = Verifier::new(options).unwrap();
    let report = verifier.verify(
        "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid, c.cid AS cid",
        "SELECT p.pid AS pid, c.cid AS cid \
         FROM person AS p \
         INNER JOIN works_at AS w ON p.pid = w.SRC \
         INNER JOIN company AS c ON w.TGT = c.cid",
        &graph_schema(),
    );
    // Either it finished inside a second or it timed out; both are legal,
    // but a timeout must carry the last completed bound (or none).
    if report.result == Verdict::Timeout {
        assert!(report.checked_bound.map_or(true, |b| b < 32));
    }
}
