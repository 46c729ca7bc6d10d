//! SMT-LIB 2 rendering of declarations and terms.

use std::fmt;

use super::term::{Sort, Term};

/// A declaration in the emitted script.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Sort(Sort),
    Const { name: String, sort: Sort },
    Fun {
        name: String,
        args: Vec<Sort>,
        ret: Sort,
    },
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Sort(sort) => write!(f, "(declare-sort {} 0)", sort.smt_name()),
            Decl::Const { name, sort } => {
                write!(f, "(declare-const {} {})", name, sort.smt_name())
            }
            Decl::Fun { name, args, ret } => {
                write!(f, "(declare-fun {} (", name)?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", arg.smt_name())?;
                }
                write!(f, ") {})", ret.smt_name())
            }
        }
    }
}

fn write_nary(f: &mut fmt::Formatter<'_>, op: &str, terms: &[Term]) -> fmt::Result {
    write!(f, "({}", op)?;
    for term in terms {
        write!(f, " {}", term)?;
    }
    write!(f, ")")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::IntLit(n) => {
                if *n < 0 {
                    write!(f, "(- {})", -n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Term::BoolLit(b) => write!(f, "{}", b),
            Term::Const(name) => write!(f, "{}", name),
            Term::App(name, args) => {
                if args.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "({}", name)?;
                    for arg in args {
                        write!(f, " {}", arg)?;
                    }
                    write!(f, ")")
                }
            }
            Term::Not(term) => write!(f, "(not {})", term),
            Term::And(terms) => write_nary(f, "and", terms),
            Term::Or(terms) => write_nary(f, "or", terms),
            Term::Implies(p, q) => write!(f, "(=> {} {})", p, q),
            Term::Ite(c, t, e) => write!(f, "(ite {} {} {})", c, t, e),
            Term::Eq(l, r) => write!(f, "(= {} {})", l, r),
            Term::Lt(l, r) => write!(f, "(< {} {})", l, r),
            Term::Le(l, r) => write!(f, "(<= {} {})", l, r),
            Term::Gt(l, r) => write!(f, "(> {} {})", l, r),
            Term::Ge(l, r) => write!(f, "(>= {} {})", l, r),
            Term::Add(terms) => write_nary(f, "+", terms),
            Term::Mul(l, r) => write!(f, "(* {} {})", l, r),
            Term::Distinct(terms) => write_nary(f, "distinct", terms),
        }
    }
}

/// Render an assertion line.
pub fn assert_line(term: &Term) -> String {
    format!("(assert {})", term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decl_rendering() {
        assert_eq!(Decl::Sort(Sort::Tuple).to_string(), "(declare-sort Tuple 0)");
        assert_eq!(
            Decl::Const {
                name: "t1".into(),
                sort: Sort::Tuple
            }
            .to_string(),
            "(declare-const t1 Tuple)"
        );
        assert_eq!(
            Decl::Fun {
                name: "person__pid".into(),
                args: vec![Sort::Tuple],
                ret: Sort::Int
            }
            .to_string(),
            "(declare-fun person__pid (Tuple) Int)"
        );
    }

    #[test]
    fn test_term_rendering() {
        let term = Term::implies(
            Term::not(Term::app("deleted", vec![Term::var("t1")])),
            Term::ge(
                Term::app("person__pid", vec![Term::var("t1")]),
                Term::IntLit(-5),
            ),
        );
        assert_eq!(
            assert_line(&term),
            "(assert (=> (not (deleted t1)) (>= (person__pid t1) (- 5))))"
        );
    }

    #[test]
    fn test_nary_rendering() {
        let term = Term::add(vec![
            Term::IntLit(1),
            Term::IntLit(2),
            Term::IntLit(3),
        ]);
        assert_eq!(term.to_string(), "(+ 1 2 3)");
    }
}
