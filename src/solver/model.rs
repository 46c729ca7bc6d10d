//! Reader for `(get-value …)` responses.
//!
//! The response is one s-expression: a list of `(expr value)` pairs in the
//! order the expressions were requested. Values are integers (negatives as
//! `(- n)`) or booleans.

use super::errors::SolverError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmtValue {
    Int(i64),
    Bool(bool),
}

impl SmtValue {
    pub fn as_int(&self) -> i64 {
        match self {
            SmtValue::Int(n) => *n,
            SmtValue::Bool(b) => *b as i64,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            SmtValue::Bool(b) => *b,
            SmtValue::Int(n) => *n != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_sexp(tokens: &[String], pos: &mut usize) -> Result<Sexp, SolverError> {
    let token = tokens
        .get(*pos)
        .ok_or_else(|| SolverError::Model("unexpected end of response".into()))?;
    *pos += 1;
    if token == "(" {
        let mut items = Vec::new();
        loop {
            match tokens.get(*pos) {
                Some(t) if t == ")" => {
                    *pos += 1;
                    return Ok(Sexp::List(items));
                }
                Some(_) => items.push(parse_sexp(tokens, pos)?),
                None => return Err(SolverError::Model("unbalanced parentheses".into())),
            }
        }
    } else if token == ")" {
        Err(SolverError::Model("unexpected ')'".into()))
    } else {
        Ok(Sexp::Atom(token.clone()))
    }
}

fn value_of(sexp: &Sexp) -> Result<SmtValue, SolverError> {
    match sexp {
        Sexp::Atom(atom) => match atom.as_str() {
            "true" => Ok(SmtValue::Bool(true)),
            "false" => Ok(SmtValue::Bool(false)),
            other => other
                .parse::<i64>()
                .map(SmtValue::Int)
                .map_err(|_| SolverError::Model(format!("unrecognized value `{}`", other))),
        },
        Sexp::List(items) => match items.as_slice() {
            [Sexp::Atom(minus), inner] if minus == "-" => {
                let value = value_of(inner)?;
                match value {
                    SmtValue::Int(n) => Ok(SmtValue::Int(-n)),
                    SmtValue::Bool(_) => {
                        Err(SolverError::Model("negated boolean value".into()))
                    }
                }
            }
            _ => Err(SolverError::Model(format!(
                "unrecognized value form: {:?}",
                sexp
            ))),
        },
    }
}

/// Parse a full `(get-value …)` response into values, request order.
pub fn parse_values(text: &str) -> Result<Vec<SmtValue>, SolverError> {
    if text.trim_start().starts_with("(error") {
        return Err(SolverError::Unexpected(text.trim().to_string()));
    }
    let tokens = tokenize(text);
    let mut pos = 0;
    let top = parse_sexp(&tokens, &mut pos)?;
    let Sexp::List(pairs) = top else {
        return Err(SolverError::Model("expected a list of pairs".into()));
    };
    pairs
        .iter()
        .map(|pair| match pair {
            Sexp::List(items) if items.len() == 2 => value_of(&items[1]),
            other => Err(SolverError::Model(format!(
                "expected (expr value) pair, got {:?}",
                other
            ))),
        })
        .collect()
}

/// True once the accumulated response text has balanced parentheses, i.e.
/// the full answer has arrived.
pub fn is_complete_response(text: &str) -> bool {
    let mut depth: i64 = 0;
    let mut seen_open = false;
    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                seen_open = true;
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    seen_open && depth <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_values() {
        let values =
            parse_values("(((person__pid t1) 42) ((deleted t1) false))").unwrap();
        assert_eq!(values, vec![SmtValue::Int(42), SmtValue::Bool(false)]);
    }

    #[test]
    fn test_parse_negative_value() {
        let values = parse_values("(((person__age t1) (- 7)))").unwrap();
        assert_eq!(values, vec![SmtValue::Int(-7)]);
    }

    #[test]
    fn test_multiline_response() {
        let text = "(((a t1) 1)\n ((b t1) true)\n ((c t2) (- 3)))";
        let values = parse_values(text).unwrap();
        assert_eq!(
            values,
            vec![SmtValue::Int(1), SmtValue::Bool(true), SmtValue::Int(-3)]
        );
    }

    #[test]
    fn test_error_response() {
        assert!(matches!(
            parse_values("(error \"model is not available\")"),
            Err(SolverError::Unexpected(_))
        ));
    }

    #[test]
    fn test_completeness_check() {
        assert!(!is_complete_response("(((a t1) 1)"));
        assert!(is_complete_response("(((a t1) 1))"));
        assert!(!is_complete_response(""));
    }
}
