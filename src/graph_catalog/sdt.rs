//! Schema-dependent transformation: rewrite rules relating graph-world
//! predicates (labels with key lists) to table-world predicates.

use serde::{Deserialize, Serialize};

/// One predicate: a name applied to an argument list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdtPredicate {
    pub name: String,
    pub args: Vec<String>,
}

impl SdtPredicate {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        SdtPredicate {
            name: name.into(),
            args,
        }
    }
}

/// A rewrite rule `left_pred -> right_pred`. The left side names a graph
/// label, the right side the induced table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdtRule {
    pub left: SdtPredicate,
    pub right: SdtPredicate,
}

/// Ordered rule set produced by schema induction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sdt {
    pub rules: Vec<SdtRule>,
}

impl Sdt {
    pub fn new() -> Self {
        Sdt::default()
    }

    pub fn add_rule(&mut self, rule: SdtRule) {
        self.rules.push(rule);
    }

    /// Find the rule whose left predicate names the given graph label.
    pub fn rule_for_label(&self, label: &str) -> Option<&SdtRule> {
        self.rules.iter().find(|r| r.left.name == label)
    }

    /// Resolve a graph label to its induced table name.
    pub fn table_for_label(&self, label: &str) -> Option<&str> {
        self.rule_for_label(label).map(|r| r.right.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lookup() {
        let mut sdt = Sdt::new();
        sdt.add_rule(SdtRule {
            left: SdtPredicate::new("Person", vec!["pid".into()]),
            right: SdtPredicate::new("person", vec!["pid".into()]),
        });
        assert_eq!(sdt.table_for_label("Person"), Some("person"));
        assert_eq!(sdt.table_for_label("Company"), None);
    }
}
