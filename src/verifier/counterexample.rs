//! Render a solver model into a human-runnable counterexample: `CREATE
//! TABLE` + `INSERT INTO` statements for every base table, the projected
//! rows of both queries as comments, and a Cypher block rebuilding the same
//! instance as a property graph.

use std::fmt::Write as _;

use chrono::{Days, NaiveDate};

use crate::config::INT_UPPER_BOUND;
use crate::encoder::context::DELETED_FN;
use crate::encoder::{EncodedPair, SymRelation};
use crate::graph_catalog::{ColumnType, RelationalSchema, Table, TableKind, SRC_COLUMN, TGT_COLUMN};
use crate::solver::{SmtSolver, SolverError};

/// One extracted cell: live value or NULL.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Value(i64),
    Null,
}

struct TableDump<'a> {
    table: &'a Table,
    /// Live tuples only, in tuple order.
    rows: Vec<Vec<Cell>>,
}

fn render_cell(cell: &Cell, ty: ColumnType, pair: &EncodedPair) -> String {
    let Cell::Value(v) = cell else {
        return "NULL".to_string();
    };
    match ty {
        ColumnType::Int => v.to_string(),
        ColumnType::Boolean => if *v != 0 { "TRUE" } else { "FALSE" }.to_string(),
        ColumnType::Date => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("fixed epoch");
            match epoch.checked_add_days(Days::new((*v).max(0) as u64)) {
                Some(date) => format!("'{}'", date.format("%Y-%m-%d")),
                None => v.to_string(),
            }
        }
        ColumnType::Varchar => match pair.ctx.lookup_string(*v) {
            Some(s) => format!("'{}'", s.replace('\'', "''")),
            None => format!("'s{}'", v),
        },
    }
}

/// Render an output-row cell without declared type information: interned
/// codes print as their string, everything else as an integer.
fn render_output_cell(cell: &Cell, pair: &EncodedPair) -> String {
    match cell {
        Cell::Null => "NULL".to_string(),
        Cell::Value(v) => {
            if *v > INT_UPPER_BOUND {
                if let Some(s) = pair.ctx.lookup_string(*v) {
                    return format!("'{}'", s.replace('\'', "''"));
                }
            }
            v.to_string()
        }
    }
}

/// Pull base-table contents out of the model. Queries the solver once.
fn extract_tables<'a>(
    solver: &mut SmtSolver,
    pair: &EncodedPair,
    schema: &'a RelationalSchema,
) -> Result<Vec<TableDump<'a>>, SolverError> {
    let mut exprs: Vec<String> = Vec::new();
    for base in &pair.db.tables {
        let table = schema.get(&base.name).expect("encoded table is in schema");
        for tuple in &base.tuples {
            exprs.push(format!("({} {})", DELETED_FN, tuple));
            for attr in &table.attrs {
                exprs.push(format!("({}__{} {})", table.name, attr, tuple));
                exprs.push(format!("({}__{}__null {})", table.name, attr, tuple));
            }
        }
    }
    let values = solver.get_values(&exprs)?;

    let mut dumps = Vec::new();
    let mut cursor = 0usize;
    for base in &pair.db.tables {
        let table = schema.get(&base.name).expect("encoded table is in schema");
        let mut rows = Vec::new();
        for _ in &base.tuples {
            let deleted = values[cursor].as_bool();
            cursor += 1;
            let mut row = Vec::with_capacity(table.attrs.len());
            for _ in &table.attrs {
                let value = values[cursor].as_int();
                let null = values[cursor + 1].as_bool();
                cursor += 2;
                row.push(if null { Cell::Null } else { Cell::Value(value) });
            }
            if !deleted {
                rows.push(row);
            }
        }
        dumps.push(TableDump { table, rows });
    }
    Ok(dumps)
}

/// Pull one output relation's live rows out of the model.
fn extract_output(
    solver: &mut SmtSolver,
    relation: &SymRelation,
) -> Result<Vec<Vec<Cell>>, SolverError> {
    let mut exprs = Vec::new();
    for row in &relation.rows {
        exprs.push(row.presence.to_string());
        for column in &row.columns {
            exprs.push(column.value.to_string());
            exprs.push(column.null.to_string());
        }
    }
    let values = solver.get_values(&exprs)?;

    let mut rows = Vec::new();
    let mut cursor = 0usize;
    for row in &relation.rows {
        let present = values[cursor].as_bool();
        cursor += 1;
        let mut cells = Vec::with_capacity(row.columns.len());
        for _ in &row.columns {
            let value = values[cursor].as_int();
            let null = values[cursor + 1].as_bool();
            cursor += 2;
            cells.push(if null { Cell::Null } else { Cell::Value(value) });
        }
        if present {
            rows.push(cells);
        }
    }
    Ok(rows)
}

fn cypher_properties(table: &Table, row: &[Cell], pair: &EncodedPair) -> String {
    let mut parts = Vec::new();
    for (attr, cell) in table.attrs.iter().zip(row.iter()) {
        if attr == SRC_COLUMN || attr == TGT_COLUMN {
            continue;
        }
        parts.push(format!(
            "{}: {}",
            attr,
            render_cell(cell, table.column_type(attr), pair)
        ));
    }
    format!("{{{}}}", parts.join(", "))
}

fn attr_index(table: &Table, attr: &str) -> Option<usize> {
    table.attrs.iter().position(|a| a == attr)
}

/// Build the Cypher `CREATE` section: nodes first, then edges with their
/// endpoints resolved by matching `SRC`/`TGT` against node primary keys.
fn render_cypher_block(dumps: &[TableDump<'_>], pair: &EncodedPair) -> String {
    // (table name, row index) -> node variable, plus pk cell per node row.
    let mut patterns: Vec<String> = Vec::new();
    let mut node_vars: Vec<(&str, Vec<(Cell, String)>)> = Vec::new();
    let mut node_counter = 1usize;

    for dump in dumps.iter().filter(|d| d.table.kind == TableKind::Node) {
        let pk_idx = attr_index(dump.table, &dump.table.pk).unwrap_or(0);
        let mut rows = Vec::new();
        for row in &dump.rows {
            let var = format!("n{}", node_counter);
            node_counter += 1;
            patterns.push(format!(
                "({}:{} {})",
                var,
                dump.table.label,
                cypher_properties(dump.table, row, pair)
            ));
            rows.push((row[pk_idx].clone(), var));
        }
        node_vars.push((dump.table.name.as_str(), rows));
    }

    let endpoint_var = |table: &str, key: &Cell| -> Option<String> {
        node_vars
            .iter()
            .find(|(name, _)| *name == table)
            .and_then(|(_, rows)| {
                rows.iter()
                    .find(|(cell, _)| cell == key)
                    .map(|(_, var)| var.clone())
            })
    };

    let mut edge_counter = 1usize;
    for dump in dumps.iter().filter(|d| d.table.kind == TableKind::Edge) {
        let src_idx = attr_index(dump.table, SRC_COLUMN);
        let tgt_idx = attr_index(dump.table, TGT_COLUMN);
        let (Some(src_idx), Some(tgt_idx)) = (src_idx, tgt_idx) else {
            continue;
        };
        let Some((src_table, _)) = dump.table.fks.get(SRC_COLUMN).cloned() else {
            continue;
        };
        let Some((tgt_table, _)) = dump.table.fks.get(TGT_COLUMN).cloned() else {
            continue;
        };
        for row in &dump.rows {
            let src_var = endpoint_var(&src_table, &row[src_idx]);
            let tgt_var = endpoint_var(&tgt_table, &row[tgt_idx]);
            let (Some(src_var), Some(tgt_var)) = (src_var, tgt_var) else {
                continue;
            };
            patterns.push(format!(
                "({})-[e{}:{} {}]->({})",
                src_var,
                edge_counter,
                dump.table.label,
                cypher_properties(dump.table, row, pair),
                tgt_var
            ));
            edge_counter += 1;
        }
    }

    if patterns.is_empty() {
        return String::new();
    }
    format!(
        "-- ----------Cypher------------\nMATCH (n) DETACH DELETE n;\nCREATE {};\n",
        patterns.join(", ")
    )
}

/// Render the full counterexample from the current (sat) solver state.
pub fn render_counterexample(
    solver: &mut SmtSolver,
    pair: &EncodedPair,
    schema: &RelationalSchema,
    sql1: &str,
    sql2: &str,
) -> Result<String, SolverError> {
    let dumps = extract_tables(solver, pair, schema)?;
    let left_rows = extract_output(solver, &pair.left)?;
    let right_rows = extract_output(solver, &pair.right)?;

    let mut out = String::new();
    out.push_str("-- ----------A counterexample found by grapheq------------\n");

    for dump in &dumps {
        let column_defs: Vec<String> = dump
            .table
            .attrs
            .iter()
            .map(|attr| format!("\t{} {}", attr, dump.table.column_type(attr).sql_name()))
            .collect();
        let _ = writeln!(
            out,
            "CREATE TABLE {} (\n{}\n);",
            dump.table.name,
            column_defs.join(",\n")
        );
        for row in &dump.rows {
            let values: Vec<String> = dump
                .table
                .attrs
                .iter()
                .zip(row.iter())
                .map(|(attr, cell)| render_cell(cell, dump.table.column_type(attr), pair))
                .collect();
            let _ = writeln!(
                out,
                "INSERT INTO {} VALUES ({});",
                dump.table.name,
                values.join(", ")
            );
        }
    }

    for (section, rows, sql) in [
        ("sql1", &left_rows, sql1),
        ("sql2", &right_rows, sql2),
    ] {
        let _ = writeln!(out, "-- ----------{}------------", section);
        for row in rows.iter() {
            let rendered: Vec<String> =
                row.iter().map(|cell| render_output_cell(cell, pair)).collect();
            let _ = writeln!(out, "-- {}", rendered.join(", "));
        }
        let _ = writeln!(out, "{};", sql.trim_end_matches(';'));
    }

    out.push_str(&render_cypher_block(&dumps, pair));
    Ok(out)
}
