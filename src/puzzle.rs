use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::debug;
use serde_json::{json, Value as JsonValue};

use crate::construct::rule_from_json;
use crate::error::{Error, Result};
use crate::grid::RectGrid;
use crate::rule::{rule_to_value, Rule, Verdict};
use crate::symbol::Symbol;

/// Which symbols a solver may place at a vertex, and how.
///
/// Construction seeds every vertex missing the layer's symbols with the
/// layer's first symbol, so a layer always has a current choice at every
/// vertex.
#[derive(Debug)]
pub struct EditLayer {
    mode: String,
    symbols: Vec<Symbol>,
}

impl EditLayer {
    /// A layer cycling through `symbols` under interaction `mode`
    /// (e.g. `toggle` or `cycle`). The symbol list must be non-empty.
    pub fn new(mode: impl Into<String>, symbols: Vec<Symbol>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(Error::EmptyEditLayer);
        }
        Ok(Self {
            mode: mode.into(),
            symbols,
        })
    }

    /// The interaction mode name.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// The user-editable symbols, in cycling order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

/// An entire puzzle as given to a player.
///
/// Owns its grid, the symbols usable in it, the rules a candidate must
/// satisfy, and the edit layers describing what the player may change.
/// `raw_grid` is a deep copy taken before edit-layer default seeding: the
/// puzzle exactly as the author gave it.
#[derive(Debug)]
pub struct Puzzle {
    grid: RectGrid,
    raw_grid: RectGrid,
    symbols: Vec<Symbol>,
    rules: Vec<Box<dyn Rule>>,
    editlayers: Vec<EditLayer>,
}

impl Puzzle {
    /// Assemble a puzzle, snapshotting `grid` as the givens and then
    /// seeding edit-layer defaults into the live grid.
    pub fn new(
        grid: RectGrid,
        symbols: Vec<Symbol>,
        rules: Vec<Box<dyn Rule>>,
        editlayers: Vec<EditLayer>,
    ) -> Self {
        let raw_grid = grid.clone();
        let mut grid = grid;

        for layer in &editlayers {
            for row in 0..grid.height() {
                for col in 0..grid.width() {
                    let present = layer
                        .symbols
                        .iter()
                        .any(|symbol| grid.get(row, col).has(symbol));
                    if !present {
                        grid.insert_symbol_front(row, col, layer.symbols[0].clone());
                    }
                }
            }
        }

        Self {
            grid,
            raw_grid,
            symbols,
            rules,
            editlayers,
        }
    }

    /// The live grid.
    pub fn grid(&self) -> &RectGrid {
        &self.grid
    }

    /// The live grid, for explicit mutation.
    pub fn grid_mut(&mut self) -> &mut RectGrid {
        &mut self.grid
    }

    /// The grid as originally given, before default seeding.
    pub fn raw_grid(&self) -> &RectGrid {
        &self.raw_grid
    }

    /// Every symbol usable in this puzzle.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The top-level rules, in declaration order.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// The edit layers, in declaration order.
    pub fn editlayers(&self) -> &[EditLayer] {
        &self.editlayers
    }

    /// Check this puzzle against every one of its rules.
    ///
    /// All rules run regardless of earlier failures; the verdict ANDs the
    /// results and joins every diagnostic with newlines.
    pub fn check(&self) -> Verdict {
        let verdicts = self
            .rules
            .iter()
            .map(|rule| {
                let verdict = rule.check(self);
                debug!(
                    "rule `{}` {}",
                    rule.kind(),
                    if verdict.passed { "passed" } else { "failed" }
                );
                verdict
            })
            .collect_vec();

        Verdict {
            passed: verdicts.iter().all(|verdict| verdict.passed),
            diagnostic: verdicts
                .iter()
                .map(|verdict| verdict.diagnostic.as_str())
                .join("\n"),
        }
    }

    /// The fixed-width text rendering of the live grid.
    pub fn render(&self) -> String {
        self.grid.to_string()
    }

    /// Serialize to the interchange format consumed by storage layers.
    ///
    /// Every object's fields are expanded by name with a `type`
    /// discriminant on polymorphic objects, so the concrete types can be
    /// reconstructed on load.
    pub fn serialize(&self) -> JsonValue {
        json!({
            "grid": self.grid.to_value(),
            "raw_grid": self.raw_grid.to_value(),
            "symbols": self.symbols.iter().map(Symbol::to_value).collect_vec(),
            "rules": self
                .rules
                .iter()
                .map(|rule| rule_to_value(rule.as_ref()))
                .collect_vec(),
            "editlayers": self
                .editlayers
                .iter()
                .map(|layer| json!({
                    "mode": layer.mode,
                    "symbols": layer.symbols.iter().map(Symbol::to_value).collect_vec(),
                }))
                .collect_vec(),
        })
    }

    /// Reconstruct a puzzle from its interchange form.
    ///
    /// The stored `raw_grid` is used as-is; default seeding is not
    /// reapplied, so a round trip preserves both grids byte-for-byte.
    pub fn deserialize(value: &JsonValue) -> Result<Self> {
        let field = |key: &str| -> Result<&JsonValue> {
            value
                .get(key)
                .ok_or_else(|| Error::Interchange(format!("puzzle without a `{key}` field")))
        };
        let array = |key: &str| -> Result<&Vec<JsonValue>> {
            field(key)?
                .as_array()
                .ok_or_else(|| Error::Interchange(format!("puzzle `{key}` must be an array")))
        };

        let grid = RectGrid::from_value(field("grid")?)?;
        let raw_grid = RectGrid::from_value(field("raw_grid")?)?;
        let symbols = array("symbols")?
            .iter()
            .map(Symbol::from_value)
            .collect::<Result<Vec<_>>>()?;
        let rules = array("rules")?
            .iter()
            .map(rule_from_json)
            .collect::<Result<Vec<_>>>()?;
        let editlayers = array("editlayers")?
            .iter()
            .map(|entry| {
                let mode = entry
                    .get("mode")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| Error::Interchange(String::from("edit layer without a `mode`")))?;
                let symbols = entry
                    .get("symbols")
                    .and_then(JsonValue::as_array)
                    .ok_or_else(|| {
                        Error::Interchange(String::from("edit layer without a `symbols` array"))
                    })?
                    .iter()
                    .map(Symbol::from_value)
                    .collect::<Result<Vec<_>>>()?;
                EditLayer::new(mode, symbols)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            grid,
            raw_grid,
            symbols,
            rules,
            editlayers,
        })
    }
}

impl Display for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule.describe())?;
        }
        write!(f, "{}", self.grid)
    }
}
