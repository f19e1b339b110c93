#![warn(missing_docs)]

//! # `nurigrid`
//!
//! A definition and validation engine for grid logic puzzles in the style of
//! [Nurikabe](https://en.wikipedia.org/wiki/Nurikabe_(puzzle)) and its relatives.
//! Puzzles are authored in a small text DSL, loaded with [`load_from_text`], and a
//! fully filled-in candidate is verified by calling [`Puzzle::check`], which runs every
//! declared rule and reports per-rule diagnostics.
//!
//! `nurigrid` does not *solve* puzzles; it represents them and judges candidate
//! solutions.
//!
//! # The text DSL
//!
//! A puzzle is one brace-wrapped block of `--flag` sections; `%` comments out the rest
//! of a line and multiple blocks may sit back to back in one file:
//!
//! ```text
//! ( --grid -rectgrid (height 3) (width 3)
//!   --vertices ((data 2-WH WH BK  BK BK BK  1-WH BK 1-WH))
//!   --rules (-nurikabe)
//!   --symbols WH BK
//!   --editlayers (-toggle (symbols WH BK)) )
//! ```
//!
//! # Internals
//!
//! A grid is a graph: cells are vertices holding symbol lists, stored row-major in an
//! [`ndarray::Array2`], with 4-directional adjacency kept in an undirected
//! [`petgraph`] graph built once at construction. Rule checks reduce to breadth-first
//! connectivity queries over that graph ([`RectGrid::region`]), so the rule set stays
//! independent of the concrete topology's coordinate math.
//!
//! Rules implement the [`Rule`] trait and compose via [`SuperRule`], which never
//! short-circuits: every sub-rule runs so that every diagnostic is available at once.
//! Puzzles serialize to a nested interchange form ([`Puzzle::serialize`]) consumed by
//! storage and transport layers, and reconstruct from it without reflection.

pub use construct::{construct_from_dict, load_from_text, rule_from_dict};
pub use error::{Error, Result};
pub use grid::{Dimension, Loc, RectGrid, Vertex};
pub use puzzle::{EditLayer, Puzzle};
pub use rule::{Rule, SuperRule, Verdict};
pub use symbol::{all_numerals, builtins, Symbol, SymbolKind, SymbolTable};
pub use value::Value;

pub(crate) mod construct;
pub(crate) mod error;
pub(crate) mod grid;
pub mod nurikabe;
pub(crate) mod parser;
pub(crate) mod puzzle;
pub(crate) mod rule;
pub(crate) mod symbol;
mod tests;
pub(crate) mod value;
