use std::collections::{HashSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::num::NonZero;

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use serde_json::{json, Value as JsonValue};
use strum::VariantArray;

use crate::error::{Error, Result};
use crate::symbol::Symbol;

type Coord = usize;
/// A nonzero grid dimension, in cells.
pub type Dimension = NonZero<Coord>;

/// A location `(row, col)` on a grid. The top left corner is `Loc(0, 0)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Loc(pub Coord, pub Coord);

impl Loc {
    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(
            self.0.wrapping_add_signed(rhs.0),
            self.1.wrapping_add_signed(rhs.1),
        )
    }
}

impl Display for Loc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub(crate) enum SquareStep {
    Up,
    Down,
    Left,
    Right,
}

impl SquareStep {
    pub(crate) fn attempt_from(&self, loc: Loc) -> Loc {
        match self {
            Self::Up => loc.offset_by((-1, 0)),
            Self::Down => loc.offset_by((1, 0)),
            Self::Left => loc.offset_by((0, -1)),
            Self::Right => loc.offset_by((0, 1)),
        }
    }
}

/// One addressable grid position holding zero or more symbols.
///
/// Duplicate symbols are allowed and insertion order is kept; order
/// matters for display but not for rule semantics. Identity for equality
/// and hashing is the vertex's location alone.
#[derive(Clone, Debug)]
pub struct Vertex {
    loc: Loc,
    symbols: Vec<Symbol>,
}

impl Vertex {
    fn at(loc: Loc) -> Self {
        Self {
            loc,
            symbols: Vec::new(),
        }
    }

    /// This vertex's immutable `(row, col)` coordinates.
    pub fn loc(&self) -> Loc {
        self.loc
    }

    /// The symbols currently on this vertex, in insertion order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Whether `symbol` is present on this vertex.
    pub fn has(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    /// Short names of every symbol here, joined by `-`.
    pub fn symbols_str(&self) -> String {
        self.symbols.iter().map(Symbol::short_name).join("-")
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.loc == other.loc
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.loc.hash(state);
    }
}

/// A rectangular grid of [`Vertex`]es under 4-directional adjacency.
///
/// Cells are stored row-major in an [`Array2`]; adjacency lives in an
/// undirected graph over locations, built once at construction, so the
/// symmetry invariant holds by construction. The grid owns its vertices
/// exclusively.
#[derive(Clone, Debug)]
pub struct RectGrid {
    // (height, width)
    dims: (Dimension, Dimension),
    cells: Array2<Vertex>,
    graph: UnGraphMap<Loc, ()>,
}

impl RectGrid {
    const DEFAULT_ENCODING: &'static str = "full";

    /// A `height` x `width` grid of empty vertices.
    pub fn new(height: Dimension, width: Dimension) -> Self {
        let cells =
            Array2::from_shape_fn((height.get(), width.get()), |ind| Vertex::at(Loc(ind.0, ind.1)));

        let mut graph = UnGraphMap::with_capacity(
            cells.len(),
            (width.get() - 1) * height.get() + (height.get() - 1) * width.get(),
        );
        for row in 0..height.get() {
            for col in 0..width.get() {
                let loc = Loc(row, col);
                graph.add_node(loc);
                for step in SquareStep::VARIANTS {
                    // out-of-bounds steps wrap around and fail this check
                    let next = step.attempt_from(loc);
                    if next.0 < height.get() && next.1 < width.get() {
                        graph.add_edge(loc, next, ());
                    }
                }
            }
        }

        Self {
            dims: (height, width),
            cells,
            graph,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.dims.0.get()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.dims.1.get()
    }

    /// The vertex at `(row, col)`.
    ///
    /// # Panics
    /// Out-of-range coordinates are a contract violation and panic.
    pub fn get(&self, row: usize, col: usize) -> &Vertex {
        &self.cells[(row, col)]
    }

    /// Append `symbol` to the vertex at `(row, col)`.
    pub fn add_symbol(&mut self, row: usize, col: usize, symbol: Symbol) {
        self.cells[(row, col)].symbols.push(symbol);
    }

    /// Insert `symbol` at the front of the vertex's symbol list.
    pub fn insert_symbol_front(&mut self, row: usize, col: usize, symbol: Symbol) {
        self.cells[(row, col)].symbols.insert(0, symbol);
    }

    /// Replace every symbol at `(row, col)` with a copy of `symbols`.
    pub fn replace_symbols(&mut self, row: usize, col: usize, symbols: &[Symbol]) {
        self.cells[(row, col)].symbols = symbols.to_vec();
    }

    /// Whether `a` and `b` are 4-directionally adjacent.
    ///
    /// Symmetric and irreflexive for all in-bounds locations.
    pub fn adjacent(&self, a: Loc, b: Loc) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// In-bounds neighbors of `loc`, in a deterministic order.
    pub fn neighbors(&self, loc: Loc) -> Vec<Loc> {
        self.graph.neighbors(loc).collect()
    }

    /// Every vertex in row-major order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.cells.iter()
    }

    /// The connected region containing `seed` in which every vertex
    /// carries `symbol`.
    ///
    /// Breadth-first from `seed`; the output is in discovery order and
    /// visits each vertex at most once. Empty when `seed` itself lacks
    /// `symbol`.
    pub fn region(&self, seed: Loc, symbol: &Symbol) -> Vec<Loc> {
        if !self.get(seed.0, seed.1).has(symbol) {
            return Vec::new();
        }

        let mut out = vec![seed];
        let mut seen = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        while let Some(at) = queue.pop_front() {
            for next in self.graph.neighbors(at) {
                if seen.contains(&next) || !self.get(next.0, next.1).has(symbol) {
                    continue;
                }
                seen.insert(next);
                out.push(next);
                queue.push_back(next);
            }
        }

        out
    }

    /// Seed every vertex's symbol list from `data`, positionally.
    ///
    /// The only known encoding is `full`: entry `i` of `data` lands on
    /// vertex `i` in row-major order, one to one; an empty entry receives
    /// a copy of `default` instead.
    pub fn init_from_encoding(
        &mut self,
        encoding: &str,
        data: &[Vec<Symbol>],
        default: &Symbol,
    ) -> Result<()> {
        if encoding != Self::DEFAULT_ENCODING {
            return Err(Error::UnknownEncoding(encoding.to_string()));
        }
        if data.len() != self.cells.len() {
            return Err(Error::VertexCountMismatch {
                got: data.len(),
                want: self.cells.len(),
            });
        }

        for (vertex, entry) in self.cells.iter_mut().zip(data) {
            vertex.symbols = match entry.is_empty() {
                true => vec![default.clone()],
                false => entry.clone(),
            };
        }
        Ok(())
    }

    /// Every distinct symbol present on the grid, in first-appearance order.
    pub fn all_symbols(&self) -> Vec<Symbol> {
        let mut out: Vec<Symbol> = Vec::new();
        for vertex in self.vertices() {
            for symbol in &vertex.symbols {
                if !out.contains(symbol) {
                    out.push(symbol.clone());
                }
            }
        }
        out
    }

    fn longest_symbol_len(&self) -> usize {
        self.vertices()
            .map(|vertex| vertex.symbols_str().len())
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn to_value(&self) -> JsonValue {
        json!({
            "type": "rectgrid",
            "height": self.height(),
            "width": self.width(),
            "vertices": self
                .vertices()
                .map(|vertex| json!({
                    "row": vertex.loc.0,
                    "col": vertex.loc.1,
                    "symbols": vertex.symbols.iter().map(Symbol::to_value).collect_vec(),
                }))
                .collect_vec(),
        })
    }

    pub(crate) fn from_value(value: &JsonValue) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::Interchange(String::from("grid without a `type`")))?;
        if kind != "rectgrid" {
            return Err(Error::UnknownGridType(kind.to_string()));
        }

        let dim = |key: &str| -> Result<Dimension> {
            value
                .get(key)
                .and_then(JsonValue::as_u64)
                .and_then(|raw| NonZero::new(raw as usize))
                .ok_or_else(|| Error::Interchange(format!("grid `{key}` must be a positive integer")))
        };
        let mut grid = Self::new(dim("height")?, dim("width")?);

        let vertices = value
            .get("vertices")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::Interchange(String::from("grid without a `vertices` array")))?;
        if vertices.len() != grid.cells.len() {
            return Err(Error::Interchange(format!(
                "grid expects {} vertices, found {}",
                grid.cells.len(),
                vertices.len()
            )));
        }
        for entry in vertices {
            let coord = |key: &str| -> Result<usize> {
                entry
                    .get(key)
                    .and_then(JsonValue::as_u64)
                    .map(|raw| raw as usize)
                    .ok_or_else(|| Error::Interchange(format!("vertex without a `{key}`")))
            };
            let (row, col) = (coord("row")?, coord("col")?);
            if row >= grid.height() || col >= grid.width() {
                return Err(Error::Interchange(format!(
                    "vertex ({row}, {col}) is out of bounds"
                )));
            }
            let symbols = entry
                .get("symbols")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| Error::Interchange(String::from("vertex without a `symbols` array")))?
                .iter()
                .map(Symbol::from_value)
                .collect::<Result<Vec<_>>>()?;
            grid.cells[(row, col)].symbols = symbols;
        }

        Ok(grid)
    }
}

impl Display for RectGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sep_len = self.longest_symbol_len() + 1;

        for row in 0..self.height() {
            for col in 0..self.width() {
                let sym = self.get(row, col).symbols_str();
                write!(f, "{}{}", sym, " ".repeat(sep_len - sym.len()))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
