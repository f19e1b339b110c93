use itertools::Itertools;
use serde_json::{json, Value as JsonValue};

use crate::puzzle::Puzzle;

/// The outcome of checking one rule against a candidate puzzle.
///
/// A failed verdict is normal interactive feedback, not an error: the
/// diagnostic names what went wrong in human-readable terms, and sibling
/// rules keep being evaluated regardless.
#[derive(Clone, Debug)]
pub struct Verdict {
    /// Whether the candidate satisfied the rule.
    pub passed: bool,
    /// Human-readable detail, set on failure and `ok` on a pass.
    pub diagnostic: String,
}

impl Verdict {
    /// A passing verdict with the default diagnostic.
    pub fn pass() -> Self {
        Self {
            passed: true,
            diagnostic: String::from("ok"),
        }
    }

    /// A failing verdict carrying `diagnostic`.
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            passed: false,
            diagnostic: diagnostic.into(),
        }
    }
}

/// A predicate over a fully filled-in candidate puzzle.
///
/// `kind` and `fields` feed the interchange format: together they are
/// enough for the rule dispatch table to reconstruct the concrete rule.
pub trait Rule: std::fmt::Debug {
    /// Check `candidate` against this rule.
    fn check(&self, candidate: &Puzzle) -> Verdict;
    /// A one-line human description of what this rule enforces.
    fn describe(&self) -> String;
    /// The dispatch-table key for this rule type.
    fn kind(&self) -> &'static str;
    /// The constructor fields of this rule, as interchange data.
    fn fields(&self) -> JsonValue;
}

pub(crate) fn rule_to_value(rule: &dyn Rule) -> JsonValue {
    let mut map = serde_json::Map::new();
    map.insert(String::from("type"), JsonValue::from(rule.kind()));
    if let JsonValue::Object(fields) = rule.fields() {
        map.extend(fields);
    }
    JsonValue::Object(map)
}

/// An AND-composition of rules which is itself a [`Rule`].
///
/// Checking never short-circuits: every sub-rule runs so that every
/// diagnostic is available at once, and the composite diagnostic is all
/// sub-diagnostics (pass or fail) joined by newlines.
#[derive(Debug)]
pub struct SuperRule {
    description: String,
    subrules: Vec<Box<dyn Rule>>,
}

impl SuperRule {
    /// Compose `subrules` under a human-readable `description`.
    pub fn new(description: impl Into<String>, subrules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            description: description.into(),
            subrules,
        }
    }

    /// The sub-rules, in evaluation order.
    pub fn subrules(&self) -> &[Box<dyn Rule>] {
        &self.subrules
    }
}

impl Rule for SuperRule {
    fn check(&self, candidate: &Puzzle) -> Verdict {
        let verdicts = self
            .subrules
            .iter()
            .map(|rule| rule.check(candidate))
            .collect_vec();

        Verdict {
            passed: verdicts.iter().all(|verdict| verdict.passed),
            diagnostic: verdicts
                .iter()
                .map(|verdict| verdict.diagnostic.as_str())
                .join("\n"),
        }
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn kind(&self) -> &'static str {
        "superrule"
    }

    fn fields(&self) -> JsonValue {
        json!({
            "description": self.description,
            "rules": self
                .subrules
                .iter()
                .map(|rule| rule_to_value(rule.as_ref()))
                .collect_vec(),
        })
    }
}
