//! The builtin rule set for Nurikabe-family puzzles.
//!
//! See <https://puzz.link/rules.html?nurikabe> for a description of the
//! puzzle and examples. Each atomic rule here is useful on its own in
//! other puzzle families; [`Nurikabe`] bundles them into one
//! [`SuperRule`].

use std::collections::HashSet;

use itertools::Itertools;
use serde_json::{json, Value as JsonValue};

use crate::grid::{Loc, RectGrid};
use crate::puzzle::Puzzle;
use crate::rule::{Rule, SuperRule, Verdict};
use crate::symbol::{all_numerals, Symbol};

/// No axis-aligned 2x2 block may be fully covered by the target symbol.
///
/// ```text
/// correct:   X . X    incorrect:   X X .
///            X X .                 X X .
///            X . .                 . X X
/// ```
#[derive(Debug)]
pub struct NoTwoByTwoSquare {
    symbol: Symbol,
}

impl NoTwoByTwoSquare {
    /// Forbid 2x2 blocks of `symbol`.
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

impl Rule for NoTwoByTwoSquare {
    fn check(&self, candidate: &Puzzle) -> Verdict {
        let grid = candidate.grid();
        for row in 0..grid.height().saturating_sub(1) {
            for col in 0..grid.width().saturating_sub(1) {
                let block = [
                    (row, col),
                    (row + 1, col),
                    (row, col + 1),
                    (row + 1, col + 1),
                ];
                if block.iter().all(|&(r, c)| grid.get(r, c).has(&self.symbol)) {
                    return Verdict::fail(format!(
                        "square detected with top-left coordinates {}",
                        Loc(row, col)
                    ));
                }
            }
        }
        Verdict::pass()
    }

    fn describe(&self) -> String {
        format!("no two-by-two square of `{}`", self.symbol)
    }

    fn kind(&self) -> &'static str {
        "notwobytwosquare"
    }

    fn fields(&self) -> JsonValue {
        json!({ "symbol": self.symbol.to_value() })
    }
}

/// All vertices carrying the target symbol must form one connected region.
#[derive(Debug)]
pub struct SingleConnectedRegion {
    symbol: Symbol,
}

impl SingleConnectedRegion {
    /// Require a single connected region of `symbol`.
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

impl Rule for SingleConnectedRegion {
    fn check(&self, candidate: &Puzzle) -> Verdict {
        let grid = candidate.grid();

        // first occurrence in grid iteration order seeds the search
        let seed = match grid.vertices().find(|vertex| vertex.has(&self.symbol)) {
            Some(vertex) => vertex.loc(),
            // there is no region to speak of
            None => return Verdict::pass(),
        };

        let in_region: HashSet<Loc> = grid.region(seed, &self.symbol).into_iter().collect();
        for vertex in grid.vertices() {
            if !in_region.contains(&vertex.loc()) && vertex.has(&self.symbol) {
                return Verdict::fail(format!(
                    "the square at {} is not part of a singular connected region",
                    vertex.loc()
                ));
            }
        }
        Verdict::pass()
    }

    fn describe(&self) -> String {
        format!("all `{}` squares form one connected region", self.symbol)
    }

    fn kind(&self) -> &'static str {
        "singleconnectedregion"
    }

    fn fields(&self) -> JsonValue {
        json!({ "symbol": self.symbol.to_value() })
    }
}

/// If a vertex carries any subset symbol it must also carry a superset one.
#[derive(Debug)]
pub struct Implicates {
    subset: Vec<Symbol>,
    superset: Vec<Symbol>,
}

impl Implicates {
    /// Require every vertex touching `subset` to also touch `superset`.
    pub fn new(subset: Vec<Symbol>, superset: Vec<Symbol>) -> Self {
        Self { subset, superset }
    }

    fn intersects(pool: &[Symbol], have: &[Symbol]) -> bool {
        have.iter().any(|symbol| pool.contains(symbol))
    }
}

impl Rule for Implicates {
    fn check(&self, candidate: &Puzzle) -> Verdict {
        for vertex in candidate.grid().vertices() {
            if !Self::intersects(&self.subset, vertex.symbols()) {
                continue;
            }
            if !Self::intersects(&self.superset, vertex.symbols()) {
                return Verdict::fail(format!(
                    "square at {} must contain one of [{}]",
                    vertex.loc(),
                    self.superset.iter().join(", ")
                ));
            }
        }
        Verdict::pass()
    }

    fn describe(&self) -> String {
        format!(
            "squares containing [{}] must also contain one of [{}]",
            self.subset.iter().join(", "),
            self.superset.iter().join(", ")
        )
    }

    fn kind(&self) -> &'static str {
        "implicates"
    }

    fn fields(&self) -> JsonValue {
        json!({
            "subset": self.subset.iter().map(Symbol::to_value).collect_vec(),
            "superset": self.superset.iter().map(Symbol::to_value).collect_vec(),
        })
    }
}

/// Numbered regions of the allowed symbol must match their number.
///
/// Every vertex carrying a numeric symbol of value `n` must sit in an
/// `allowed`-region of exactly `n` vertices containing exactly one
/// number; any leftover `allowed` region with no number at all fails.
#[derive(Debug)]
pub struct RegionSizesEqualNumbers {
    allowed: Symbol,
}

impl RegionSizesEqualNumbers {
    /// Size regions of `allowed` against the numbers they contain.
    pub fn new(allowed: Symbol) -> Self {
        Self { allowed }
    }

    fn check_one(
        &self,
        grid: &RectGrid,
        seed: Loc,
        size: u32,
        visited: &mut Vec<Loc>,
    ) -> Option<Verdict> {
        let region = grid.region(seed, &self.allowed);
        visited.extend(region.iter().copied());

        if region.len() != size as usize {
            return Some(Verdict::fail(format!(
                "the number at {seed} has an incorrect region size"
            )));
        }

        let mut numbers = 0;
        for &Loc(row, col) in &region {
            for symbol in grid.get(row, col).symbols() {
                if symbol.numeric_value().is_none() {
                    continue;
                }
                numbers += 1;
                if numbers > 1 {
                    return Some(Verdict::fail("a region contains more than one number"));
                }
            }
        }
        None
    }
}

impl Rule for RegionSizesEqualNumbers {
    fn check(&self, candidate: &Puzzle) -> Verdict {
        let grid = candidate.grid();

        let mut visited: Vec<Loc> = Vec::new();
        for vertex in grid.vertices() {
            for symbol in vertex.symbols() {
                if let Some(size) = symbol.numeric_value() {
                    if let Some(verdict) = self.check_one(grid, vertex.loc(), size, &mut visited) {
                        return verdict;
                    }
                }
            }
        }

        // no region may remain unnumbered
        let visited: HashSet<Loc> = visited.into_iter().collect();
        for vertex in grid.vertices() {
            if !visited.contains(&vertex.loc()) && vertex.has(&self.allowed) {
                return Verdict::fail("there exists a region without a number");
            }
        }
        Verdict::pass()
    }

    fn describe(&self) -> String {
        format!(
            "`{}` regions are sized by the single number they contain",
            self.allowed
        )
    }

    fn kind(&self) -> &'static str {
        "regionsizesequalnumbers"
    }

    fn fields(&self) -> JsonValue {
        json!({ "symbol": self.allowed.to_value() })
    }
}

/// The full Nurikabe legality constraint as one composite rule.
///
/// Black squares form no 2x2 block and one connected region; numbered
/// squares are white; white regions are sized and singly numbered.
#[derive(Debug)]
pub struct Nurikabe {
    white: Symbol,
    black: Symbol,
    inner: SuperRule,
}

impl Nurikabe {
    /// A Nurikabe rule over the given fill symbols.
    pub fn new(white: Symbol, black: Symbol) -> Self {
        let inner = SuperRule::new(
            "nurikabe",
            vec![
                Box::new(NoTwoByTwoSquare::new(black.clone())),
                Box::new(SingleConnectedRegion::new(black.clone())),
                Box::new(Implicates::new(all_numerals(), vec![white.clone()])),
                Box::new(RegionSizesEqualNumbers::new(white.clone())),
            ],
        );
        Self {
            white,
            black,
            inner,
        }
    }
}

impl Default for Nurikabe {
    fn default() -> Self {
        Self::new(Symbol::colored("WH"), Symbol::colored("BK"))
    }
}

impl Rule for Nurikabe {
    fn check(&self, candidate: &Puzzle) -> Verdict {
        self.inner.check(candidate)
    }

    fn describe(&self) -> String {
        format!(
            "nurikabe over `{}` islands and a `{}` sea",
            self.white, self.black
        )
    }

    fn kind(&self) -> &'static str {
        "nurikabe"
    }

    fn fields(&self) -> JsonValue {
        json!({
            "white": self.white.to_value(),
            "black": self.black.to_value(),
        })
    }
}
