//! End-to-end checks of the front half of the pipeline: schema induction,
//! transpilation and SQL printing.

use grapheq::cypher_parser::{parse_query, strip_comments};
use grapheq::graph_catalog::{infer_sdt, EdgeType, GraphSchema, NodeType, SRC_COLUMN, TGT_COLUMN};
use grapheq::sql_ir::ToSql;
use grapheq::transpiler::transpile;

fn works_at_schema() -> GraphSchema {
    let mut schema = GraphSchema::new();
    schema
        .add_node(NodeType::new("Person", vec!["pid".into(), "name".into()]))
        .unwrap();
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

fn transpile_to_sql(cypher: &str, schema: &GraphSchema) -> String {
    let induced = infer_sdt(schema).expect("schema induction");
    let cleaned = strip_comments(cypher);
    let query = parse_query(&cleaned).expect("cypher parse");
    transpile(&query, &induced.sdt, &induced.schema)
        .expect("transpile")
        .to_sql()
}

#[test]
fn induced_schema_matches_the_paper_rules() {
    let induced = infer_sdt(&works_at_schema()).unwrap();

    let person = induced.schema.get("person").unwrap();
    assert_eq!(person.attrs, vec!["pid", "name"]);
    assert_eq!(person.pk, "pid");

    let company = induced.schema.get("company").unwrap();
    assert_eq!(company.attrs, vec!["cid", "title"]);
    assert_eq!(company.pk, "cid");

    let works_at = induced.schema.get("works_at").unwrap();
    assert_eq!(works_at.attrs, vec!["wid", "SRC", "TGT"]);
    assert_eq!(works_at.pk, "wid");
    assert_eq!(
        works_at.fks[SRC_COLUMN],
        ("person".to_string(), "pid".to_string())
    );
    assert_eq!(
        works_at.fks[TGT_COLUMN],
        ("company".to_string(), "cid".to_string())
    );

    // Three rules: two node rules, one edge rule with the link columns.
    assert_eq!(induced.sdt.rules.len(), 3);
    let edge_rule = induced.sdt.rule_for_label("WORKS_AT").unwrap();
    assert_eq!(edge_rule.left.args, vec!["wid", "SRC", "TGT"]);
}

#[test]
fn simple_join_produces_the_expected_sql() {
    let sql = transpile_to_sql(
        "MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid, c.cid AS cid",
        &works_at_schema(),
    );
    assert!(sql.starts_with("SELECT p.pid AS pid, c.cid AS cid FROM"));
    assert!(sql.contains("person AS p INNER JOIN works_at AS w ON p.pid = w.SRC"));
    assert!(sql.contains("INNER JOIN company AS c ON w.TGT = c.cid"));
}

#[test]
fn optional_match_produces_left_joins() {
    let sql = transpile_to_sql(
        "OPTIONAL MATCH (p:Person)-[w:WORKS_AT]->(c:Company) RETURN p.pid AS pid, c.cid AS cid",
        &works_at_schema(),
    );
    assert_eq!(sql.matches("LEFT JOIN").count(), 2);
    assert!(!sql.contains("INNER JOIN"));
}

#[test]
fn aggregation_groups_by_non_aggregate_items() {
    let sql = transpile_to_sql(
        "MATCH (p:Person) RETURN p.pid AS pid, COUNT(*) AS n",
        &works_at_schema(),
    );
    assert_eq!(
        sql,
        "SELECT p.pid AS pid, COUNT(*) AS n FROM person AS p GROUP BY p.pid"
    );
}

#[test]
fn where_clause_lowers_into_fused_select() {
    let sql = transpile_to_sql(
        "MATCH (p:Person) WHERE p.name = 'Ada' RETURN p.pid AS pid",
        &works_at_schema(),
    );
    assert_eq!(
        sql,
        "SELECT p.pid AS pid FROM person AS p WHERE p.name = 'Ada'"
    );
}

#[test]
fn union_and_order_by_survive_the_pipeline() {
    let sql = transpile_to_sql(
        "MATCH (p:Person) RETURN p.name AS n \
         UNION ALL MATCH (c:Company) RETURN c.title AS n \
         ORDER BY p.name DESC",
        &works_at_schema(),
    );
    assert!(sql.contains("UNION ALL"));
    assert!(sql.contains("ORDER BY p.name DESC"));
}

#[test]
fn comments_are_stripped_before_parsing() {
    let sql = transpile_to_sql(
        "MATCH (p:Person) -- all people\nRETURN p.pid AS pid /* that's it */",
        &works_at_schema(),
    );
    assert_eq!(sql, "SELECT p.pid AS pid FROM person AS p");
}

#[test]
fn two_hop_path_emits_four_joins_in_order() {
    let mut schema = works_at_schema();
    schema
        .add_edge(EdgeType::new(
            "OWNS",
            "Person",
            "Company",
            vec!["oid".into()],
        ))
        .unwrap();
    let sql = transpile_to_sql(
        "MATCH (p:Person)-[w:WORKS_AT]->(c:Company)<-[o:OWNS]-(q:Person) \
         RETURN p.pid AS a, q.pid AS b",
        &schema,
    );
    // Segment 1 forward: p->w->c; segment 2 incoming: c.pk = o.TGT, o.SRC = q.pk.
    let first = sql.find("ON p.pid = w.SRC").expect("first join");
    let second = sql.find("ON w.TGT = c.cid").expect("second join");
    let third = sql.find("ON c.cid = o.TGT").expect("third join");
    let fourth = sql.find("ON o.SRC = q.pid").expect("fourth join");
    assert!(first < second && second < third && third < fourth);
}
