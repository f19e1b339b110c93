use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

use crate::error::{Error, Result};

/// Numerals `0..MAX_NUMERAL` are registered at startup.
pub const MAX_NUMERAL: u32 = 31;

/// Discriminates the concrete flavor of a [`Symbol`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SymbolKind {
    /// The placeholder symbol for a cell with nothing on it.
    Empty,
    /// A filled cell of some color, keyed by its color code.
    Colored,
    /// A numeric clue.
    Number(u32),
}

/// An atomic marker placeable on a grid vertex.
///
/// A symbol has an internal identity (its short name) and an external
/// display key (its file name) consumed by rendering layers. Symbols are
/// immutable value objects; equality and hashing consider the short name
/// *only*, so a symbol reconstructed from serialized data compares equal
/// to the table's original.
#[derive(Clone, Debug)]
pub struct Symbol {
    short_name: String,
    file_name: String,
    kind: SymbolKind,
}

impl Symbol {
    const COLOR_FILE_PREFIX: &'static str = "Color";
    const NUMBER_FILE_PREFIX: &'static str = "Num";

    /// The `_` symbol marking a cell with nothing on it.
    pub fn empty() -> Self {
        Self {
            short_name: String::from("_"),
            file_name: String::from("empty"),
            kind: SymbolKind::Empty,
        }
    }

    /// A colored fill symbol, e.g. `WH` or `BK`.
    pub fn colored(code: &str) -> Self {
        Self {
            short_name: code.to_string(),
            file_name: format!("{}_{}", Self::COLOR_FILE_PREFIX, code),
            kind: SymbolKind::Colored,
        }
    }

    /// A numeric clue symbol; its short name is the decimal string.
    pub fn number(value: u32) -> Self {
        Self {
            short_name: value.to_string(),
            file_name: format!("{}_{}", Self::NUMBER_FILE_PREFIX, value),
            kind: SymbolKind::Number(value),
        }
    }

    /// The short name identifying this symbol.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The display key used by rendering layers.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Which flavor of symbol this is.
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// The numeric value, if this is a [`SymbolKind::Number`] symbol.
    pub fn numeric_value(&self) -> Option<u32> {
        match self.kind {
            SymbolKind::Number(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn to_value(&self) -> JsonValue {
        let kind = match self.kind {
            SymbolKind::Empty => "empty",
            SymbolKind::Colored => "colored",
            SymbolKind::Number(_) => "number",
        };
        let mut out = json!({
            "type": kind,
            "short_name": self.short_name,
            "file_name": self.file_name,
        });
        if let SymbolKind::Number(value) = self.kind {
            out["value"] = json!(value);
        }
        out
    }

    pub(crate) fn from_value(value: &JsonValue) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::Interchange(String::from("symbol without a `type`")))?;
        match kind {
            "empty" => Ok(Self::empty()),
            "colored" => {
                let code = value
                    .get("short_name")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| {
                        Error::Interchange(String::from("colored symbol without a `short_name`"))
                    })?;
                Ok(Self::colored(code))
            }
            "number" => {
                let numeric = value
                    .get("value")
                    .and_then(JsonValue::as_u64)
                    .ok_or_else(|| {
                        Error::Interchange(String::from("number symbol without a `value`"))
                    })?;
                Ok(Self::number(numeric as u32))
            }
            other => Err(Error::Interchange(format!("unknown symbol type `{other}`"))),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.short_name == other.short_name
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.short_name.hash(state);
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name)
    }
}

/// All the numeral symbols, constructed eagerly.
pub fn all_numerals() -> Vec<Symbol> {
    (0..MAX_NUMERAL).map(Symbol::number).collect()
}

/// A mapping from short names to the canonical [`Symbol`] instance.
///
/// The table is append-only in spirit: registering under an existing short
/// name silently replaces the prior binding, and nothing can be removed.
pub struct SymbolTable {
    map: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// An empty table with nothing registered.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// The builtin symbol set: `_`, `WH`, `BK`, and numerals `0..31`.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.register(Symbol::empty());
        table.register(Symbol::colored("WH"));
        table.register(Symbol::colored("BK"));
        for numeral in all_numerals() {
            table.register(numeral);
        }
        table
    }

    /// Register `symbol` under its short name, replacing any prior binding.
    pub fn register(&mut self, symbol: Symbol) {
        self.map.insert(symbol.short_name.clone(), symbol);
    }

    /// Look up the symbol registered under `short_name`.
    pub fn lookup(&self, short_name: &str) -> Result<&Symbol> {
        self.map
            .get(short_name)
            .ok_or_else(|| Error::UnknownSymbol(short_name.to_string()))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The process-wide builtin table, initialized once and read-only after.
///
/// Callers needing custom symbols should build their own [`SymbolTable`]
/// and thread it through the constructor instead of mutating shared state.
pub fn builtins() -> &'static SymbolTable {
    static BUILTINS: Lazy<SymbolTable> = Lazy::new(SymbolTable::builtin);
    &BUILTINS
}
