//! Per-verification encoding state: sort and function declarations, the
//! assertion set, fresh tuple/label supplies, and the string-literal
//! interning table.
//!
//! One context lives for exactly one `(bound, query pair)` encoding. Nothing
//! here survives a verification call; retrying at a larger bound starts from
//! a fresh context.

use std::collections::{HashMap, HashSet};

use crate::config::INT_UPPER_BOUND;
use crate::solver::{Decl, Sort, Term};

/// Function symbol for tuple liveness.
pub const DELETED_FN: &str = "deleted";

/// Aggregate function symbols, each `Tuple × Label → Int`.
pub const AGG_COUNT_FN: &str = "agg_count";
pub const AGG_SUM_FN: &str = "agg_sum";
pub const AGG_MIN_FN: &str = "agg_min";
pub const AGG_MAX_FN: &str = "agg_max";
pub const AGG_AVG_FN: &str = "agg_avg";

/// The shared label used by every `COUNT(*)`.
pub const COUNT_ALL_LABEL: &str = "label_all";

#[derive(Debug)]
pub struct EncodingContext {
    decls: Vec<Decl>,
    assertions: Vec<Term>,
    declared: HashSet<String>,
    tuple_count: usize,
    label_count: usize,
    strings: Vec<String>,
    string_codes: HashMap<String, i64>,
}

impl EncodingContext {
    pub fn new() -> Self {
        let mut ctx = EncodingContext {
            decls: Vec::new(),
            assertions: Vec::new(),
            declared: HashSet::new(),
            tuple_count: 0,
            label_count: 0,
            strings: Vec::new(),
            string_codes: HashMap::new(),
        };
        ctx.decls.push(Decl::Sort(Sort::Tuple));
        ctx.decls.push(Decl::Sort(Sort::Label));
        ctx.declare_fun(DELETED_FN, vec![Sort::Tuple], Sort::Bool);
        for agg in [AGG_COUNT_FN, AGG_SUM_FN, AGG_MIN_FN, AGG_MAX_FN, AGG_AVG_FN] {
            ctx.declare_fun(agg, vec![Sort::Tuple, Sort::Label], Sort::Int);
        }
        ctx.declare_const(COUNT_ALL_LABEL, Sort::Label);
        ctx
    }

    fn declare_const(&mut self, name: &str, sort: Sort) {
        if self.declared.insert(name.to_string()) {
            self.decls.push(Decl::Const {
                name: name.to_string(),
                sort,
            });
        }
    }

    fn declare_fun(&mut self, name: &str, args: Vec<Sort>, ret: Sort) {
        if self.declared.insert(name.to_string()) {
            self.decls.push(Decl::Fun {
                name: name.to_string(),
                args,
                ret,
            });
        }
    }

    /// Fresh tuple constant `t1, t2, …`.
    pub fn fresh_tuple(&mut self) -> String {
        self.tuple_count += 1;
        let name = format!("t{}", self.tuple_count);
        self.declare_const(&name, Sort::Tuple);
        name
    }

    /// Fresh aggregate label `l1, l2, …`.
    pub fn fresh_label(&mut self) -> String {
        self.label_count += 1;
        let name = format!("l{}", self.label_count);
        self.declare_const(&name, Sort::Label);
        name
    }

    /// `VALUE` function for a column: `table__attr : Tuple → Int`.
    pub fn value_fun(&mut self, table: &str, attr: &str) -> String {
        let name = format!("{}__{}", table, attr);
        self.declare_fun(&name, vec![Sort::Tuple], Sort::Int);
        name
    }

    /// `NULL` predicate for a column: `table__attr__null : Tuple → Bool`.
    pub fn null_fun(&mut self, table: &str, attr: &str) -> String {
        let name = format!("{}__{}__null", table, attr);
        self.declare_fun(&name, vec![Sort::Tuple], Sort::Bool);
        name
    }

    pub fn deleted(tuple: &str) -> Term {
        Term::app(DELETED_FN, vec![Term::var(tuple)])
    }

    /// Intern a string literal into the disjoint integer range above
    /// `INT_UPPER_BOUND`. Injective per context.
    pub fn intern_string(&mut self, literal: &str) -> i64 {
        if let Some(code) = self.string_codes.get(literal) {
            return *code;
        }
        let code = INT_UPPER_BOUND + 1 + self.strings.len() as i64;
        self.strings.push(literal.to_string());
        self.string_codes.insert(literal.to_string(), code);
        code
    }

    /// Reverse lookup for counterexample rendering.
    pub fn lookup_string(&self, code: i64) -> Option<&str> {
        let idx = code - INT_UPPER_BOUND - 1;
        if idx < 0 {
            return None;
        }
        self.strings.get(idx as usize).map(|s| s.as_str())
    }

    pub fn assert(&mut self, term: Term) {
        if term != Term::TRUE {
            self.assertions.push(term);
        }
    }

    pub fn assertions(&self) -> &[Term] {
        &self.assertions
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    /// Full script prefix: declarations, then the accumulated assertions.
    pub fn script_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.decls.iter().map(|d| d.to_string()).collect();
        lines.extend(
            self.assertions
                .iter()
                .map(crate::solver::assert_line),
        );
        lines
    }
}

impl Default for EncodingContext {
    fn default() -> Self {
        Self::new()
    }
}
