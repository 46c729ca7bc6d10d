//! Quantifier-free first-order terms over Bool, Int and two uninterpreted
//! sorts (`Tuple` for database rows, `Label` for aggregate tags).
//!
//! Constructors do light simplification (dropping `true` conjuncts and so
//! on) to keep the emitted scripts readable.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Bool,
    Int,
    Tuple,
    Label,
}

impl Sort {
    pub fn smt_name(&self) -> &'static str {
        match self {
            Sort::Bool => "Bool",
            Sort::Int => "Int",
            Sort::Tuple => "Tuple",
            Sort::Label => "Label",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    IntLit(i64),
    BoolLit(bool),
    Const(String),
    /// Uninterpreted function application.
    App(String, Vec<Term>),
    Not(Box<Term>),
    And(Vec<Term>),
    Or(Vec<Term>),
    Implies(Box<Term>, Box<Term>),
    Ite(Box<Term>, Box<Term>, Box<Term>),
    Eq(Box<Term>, Box<Term>),
    Lt(Box<Term>, Box<Term>),
    Le(Box<Term>, Box<Term>),
    Gt(Box<Term>, Box<Term>),
    Ge(Box<Term>, Box<Term>),
    Add(Vec<Term>),
    Mul(Box<Term>, Box<Term>),
    Distinct(Vec<Term>),
}

impl Term {
    pub const TRUE: Term = Term::BoolLit(true);
    pub const FALSE: Term = Term::BoolLit(false);

    pub fn var(name: impl Into<String>) -> Term {
        Term::Const(name.into())
    }

    pub fn app(name: impl Into<String>, args: Vec<Term>) -> Term {
        Term::App(name.into(), args)
    }

    pub fn not(term: Term) -> Term {
        match term {
            Term::BoolLit(b) => Term::BoolLit(!b),
            Term::Not(inner) => *inner,
            other => Term::Not(Box::new(other)),
        }
    }

    pub fn and(terms: Vec<Term>) -> Term {
        let mut kept = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Term::BoolLit(true) => {}
                Term::BoolLit(false) => return Term::FALSE,
                Term::And(inner) => kept.extend(inner),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Term::TRUE,
            1 => kept.pop().unwrap(),
            _ => Term::And(kept),
        }
    }

    pub fn or(terms: Vec<Term>) -> Term {
        let mut kept = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Term::BoolLit(false) => {}
                Term::BoolLit(true) => return Term::TRUE,
                Term::Or(inner) => kept.extend(inner),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Term::FALSE,
            1 => kept.pop().unwrap(),
            _ => Term::Or(kept),
        }
    }

    pub fn implies(premise: Term, conclusion: Term) -> Term {
        match (&premise, &conclusion) {
            (Term::BoolLit(false), _) => Term::TRUE,
            (Term::BoolLit(true), _) => conclusion,
            (_, Term::BoolLit(true)) => Term::TRUE,
            _ => Term::Implies(Box::new(premise), Box::new(conclusion)),
        }
    }

    pub fn ite(cond: Term, then: Term, otherwise: Term) -> Term {
        match cond {
            Term::BoolLit(true) => then,
            Term::BoolLit(false) => otherwise,
            cond => Term::Ite(Box::new(cond), Box::new(then), Box::new(otherwise)),
        }
    }

    pub fn eq(left: Term, right: Term) -> Term {
        Term::Eq(Box::new(left), Box::new(right))
    }

    pub fn lt(left: Term, right: Term) -> Term {
        Term::Lt(Box::new(left), Box::new(right))
    }

    pub fn le(left: Term, right: Term) -> Term {
        Term::Le(Box::new(left), Box::new(right))
    }

    pub fn gt(left: Term, right: Term) -> Term {
        Term::Gt(Box::new(left), Box::new(right))
    }

    pub fn ge(left: Term, right: Term) -> Term {
        Term::Ge(Box::new(left), Box::new(right))
    }

    pub fn add(terms: Vec<Term>) -> Term {
        let mut kept: Vec<Term> = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Term::IntLit(0) => {}
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Term::IntLit(0),
            1 => kept.pop().unwrap(),
            _ => Term::Add(kept),
        }
    }

    pub fn mul(left: Term, right: Term) -> Term {
        Term::Mul(Box::new(left), Box::new(right))
    }

    pub fn distinct(terms: Vec<Term>) -> Term {
        if terms.len() < 2 {
            return Term::TRUE;
        }
        Term::Distinct(terms)
    }

    /// `1` when the condition holds, else `0`: the counting building block.
    pub fn count_if(cond: Term) -> Term {
        Term::ite(cond, Term::IntLit(1), Term::IntLit(0))
    }
}

/// Three-valued-logic helpers shared by the encoder.
///
/// `same`: SQL "is not distinct from" over (null, value) pairs — two NULLs
/// compare equal. `equality`: strict SQL `=`, true only when both sides are
/// non-null and equal.
pub fn encode_same(null1: Term, null2: Term, value1: Term, value2: Term) -> Term {
    Term::or(vec![
        Term::and(vec![null1.clone(), null2.clone()]),
        Term::and(vec![
            Term::not(null1),
            Term::not(null2),
            Term::eq(value1, value2),
        ]),
    ])
}

pub fn encode_equality(null1: Term, null2: Term, value1: Term, value2: Term) -> Term {
    Term::and(vec![
        Term::not(null1),
        Term::not(null2),
        Term::eq(value1, value2),
    ])
}

pub fn encode_inequality(null1: Term, null2: Term, value1: Term, value2: Term) -> Term {
    Term::and(vec![
        Term::not(null1),
        Term::not(null2),
        Term::not(Term::eq(value1, value2)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_simplification() {
        assert_eq!(Term::and(vec![]), Term::TRUE);
        assert_eq!(Term::and(vec![Term::TRUE, Term::TRUE]), Term::TRUE);
        assert_eq!(
            Term::and(vec![Term::var("a"), Term::FALSE]),
            Term::FALSE
        );
        assert_eq!(Term::and(vec![Term::var("a")]), Term::var("a"));
    }

    #[test]
    fn test_or_flattening() {
        let or = Term::or(vec![
            Term::var("a"),
            Term::Or(vec![Term::var("b"), Term::var("c")]),
        ]);
        assert_eq!(
            or,
            Term::Or(vec![Term::var("a"), Term::var("b"), Term::var("c")])
        );
    }

    #[test]
    fn test_not_collapses() {
        assert_eq!(Term::not(Term::not(Term::var("a"))), Term::var("a"));
        assert_eq!(Term::not(Term::TRUE), Term::FALSE);
    }

    #[test]
    fn test_ite_constant_folding() {
        assert_eq!(
            Term::ite(Term::TRUE, Term::IntLit(1), Term::IntLit(0)),
            Term::IntLit(1)
        );
    }

    #[test]
    fn test_encode_same_shape() {
        let same = encode_same(
            Term::var("n1"),
            Term::var("n2"),
            Term::var("v1"),
            Term::var("v2"),
        );
        assert!(matches!(same, Term::Or(_)));
    }
}
