//! Lowers parsed field dictionaries into live [`Puzzle`] objects.
//!
//! All string-keyed dispatch (grid types, rule types) happens here, in
//! explicit match tables, so an unknown name is a single well-defined
//! error path.

use std::collections::HashMap;
use std::num::NonZero;

use log::debug;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::grid::{Dimension, RectGrid};
use crate::nurikabe::{
    Implicates, NoTwoByTwoSquare, Nurikabe, RegionSizesEqualNumbers, SingleConnectedRegion,
};
use crate::parser;
use crate::puzzle::{EditLayer, Puzzle};
use crate::rule::{Rule, SuperRule};
use crate::symbol::{Symbol, SymbolTable};
use crate::value::Value;

/// Load every puzzle described by `input`, resolving symbols via `table`.
///
/// This is the whole pipeline: tokenize, nest, split into per-puzzle
/// field dictionaries, and construct. Any malformed block fails the whole
/// file.
pub fn load_from_text(input: &str, table: &SymbolTable) -> Result<Vec<Puzzle>> {
    parser::parse_txt(input)?
        .iter()
        .map(|fields| construct_from_dict(fields, table))
        .collect()
}

/// Build one [`Puzzle`] from a parsed field dictionary.
pub fn construct_from_dict(fields: &HashMap<String, Value>, table: &SymbolTable) -> Result<Puzzle> {
    let grid_fields = fields
        .get("grid")
        .ok_or(Error::MissingGrid)?
        .as_dict()
        .ok_or(Error::BadField {
            field: String::from("grid"),
            expected: "a field dictionary",
        })?;
    let mut grid = grid_from_dict(grid_fields)?;

    if let Some(vertex_fields) = fields.get("vertices") {
        init_vertices(&mut grid, vertex_fields, table)?;
    }

    let rules = match fields.get("rules") {
        Some(value) => rules_from_value(value, table)?,
        None => Vec::new(),
    };
    debug!("constructed {} rules", rules.len());

    let symbols = match fields.get("symbols") {
        Some(value) => symbol_names(value, "symbols")?
            .iter()
            .map(|name| table.lookup(name).cloned())
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let editlayers = match fields.get("editlayers") {
        Some(value) => editlayers_from_value(value, table)?,
        None => Vec::new(),
    };

    Ok(Puzzle::new(grid, symbols, rules, editlayers))
}

fn grid_from_dict(fields: &HashMap<String, Value>) -> Result<RectGrid> {
    let kind = str_field(fields, "type", "a grid type name")?;
    match kind.to_lowercase().as_str() {
        "rectgrid" => {
            let height = dim_field(fields, "height")?;
            let width = dim_field(fields, "width")?;
            debug!("constructing rectgrid {}x{}", height, width);
            Ok(RectGrid::new(height, width))
        }
        other => Err(Error::UnknownGridType(other.to_string())),
    }
}

fn init_vertices(grid: &mut RectGrid, fields: &Value, table: &SymbolTable) -> Result<()> {
    let dict = fields.as_dict().ok_or(Error::BadField {
        field: String::from("vertices"),
        expected: "a field dictionary",
    })?;
    let data = dict.get("data").ok_or(Error::MissingVertexData)?;

    let encoding = match dict.get("encoding") {
        Some(value) => value.as_str().ok_or(Error::BadField {
            field: String::from("encoding"),
            expected: "an encoding scheme name",
        })?,
        None => "full",
    };
    let default_name = match dict.get("default") {
        Some(value) => one_symbol_name(value, "default")?,
        None => String::from("_"),
    };
    let default = table.lookup(&default_name)?.clone();

    let entries = state_entries(data)?
        .iter()
        .map(|names| {
            names
                .iter()
                .map(|name| table.lookup(name).cloned())
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    grid.init_from_encoding(encoding, &entries, &default)
}

/// Normalize the state-parsed `data` value into per-vertex name lists.
///
/// A `data` field with several tokens parses to a list of state tuples;
/// with exactly one token the tuple arrives unwrapped, so a list whose
/// elements are not all lists is itself a single entry.
fn state_entries(data: &Value) -> Result<Vec<Vec<String>>> {
    let items = data.as_list().ok_or(Error::BadField {
        field: String::from("data"),
        expected: "state tuples",
    })?;

    let tuple_names = |tuple: &Value| -> Result<Vec<String>> {
        tuple
            .as_list()
            .ok_or(Error::BadField {
                field: String::from("data"),
                expected: "state tuples",
            })?
            .iter()
            .map(|name| one_symbol_name(name, "data"))
            .collect()
    };

    if items.iter().all(|item| matches!(item, Value::List(_))) {
        items.iter().map(tuple_names).collect()
    } else {
        // a lone state tuple such as `(data WH-BK)`
        Ok(vec![items
            .iter()
            .map(|name| one_symbol_name(name, "data"))
            .collect::<Result<Vec<_>>>()?])
    }
}

fn rules_from_value(value: &Value, table: &SymbolTable) -> Result<Vec<Box<dyn Rule>>> {
    value
        .as_list()
        .ok_or(Error::BadField {
            field: String::from("rules"),
            expected: "a list of rule dictionaries",
        })?
        .iter()
        .map(|entry| {
            let dict = entry.as_dict().ok_or(Error::BadField {
                field: String::from("rules"),
                expected: "a list of rule dictionaries",
            })?;
            rule_from_dict(dict, table)
        })
        .collect()
}

/// The rule dispatch table for DSL-declared rules.
pub fn rule_from_dict(fields: &HashMap<String, Value>, table: &SymbolTable) -> Result<Box<dyn Rule>> {
    let kind = str_field(fields, "type", "a rule type name")?;
    let rule: Box<dyn Rule> = match kind.to_lowercase().as_str() {
        "nurikabe" => {
            let white = optional_symbol(fields, "white", table)?
                .unwrap_or_else(|| Symbol::colored("WH"));
            let black = optional_symbol(fields, "black", table)?
                .unwrap_or_else(|| Symbol::colored("BK"));
            Box::new(Nurikabe::new(white, black))
        }
        "notwobytwosquare" => Box::new(NoTwoByTwoSquare::new(required_symbol(
            fields, "symbol", table,
        )?)),
        "singleconnectedregion" => Box::new(SingleConnectedRegion::new(required_symbol(
            fields, "symbol", table,
        )?)),
        "regionsizesequalnumbers" => Box::new(RegionSizesEqualNumbers::new(required_symbol(
            fields, "symbol", table,
        )?)),
        "implicates" => {
            let resolve = |field: &str| -> Result<Vec<Symbol>> {
                let value = fields.get(field).ok_or(Error::BadField {
                    field: field.to_string(),
                    expected: "a list of symbol names",
                })?;
                symbol_names(value, field)?
                    .iter()
                    .map(|name| table.lookup(name).cloned())
                    .collect()
            };
            Box::new(Implicates::new(resolve("subset")?, resolve("superset")?))
        }
        other => return Err(Error::UnknownRuleType(other.to_string())),
    };
    Ok(rule)
}

fn editlayers_from_value(value: &Value, table: &SymbolTable) -> Result<Vec<EditLayer>> {
    value
        .as_list()
        .ok_or(Error::BadField {
            field: String::from("editlayers"),
            expected: "a list of edit layer dictionaries",
        })?
        .iter()
        .map(|entry| {
            let dict = entry.as_dict().ok_or(Error::BadField {
                field: String::from("editlayers"),
                expected: "a list of edit layer dictionaries",
            })?;

            let mode = match dict.get("type") {
                Some(value) => value
                    .as_str()
                    .ok_or(Error::BadField {
                        field: String::from("type"),
                        expected: "an interaction mode name",
                    })?
                    .to_string(),
                None => String::from("toggle"),
            };
            let symbols = dict
                .get("symbols")
                .ok_or(Error::EmptyEditLayer)
                .and_then(|value| symbol_names(value, "symbols"))?
                .iter()
                .map(|name| table.lookup(name).cloned())
                .collect::<Result<Vec<_>>>()?;

            EditLayer::new(mode, symbols)
        })
        .collect()
}

/// The rule dispatch table for interchange data, where fields hold whole
/// symbol objects rather than short names.
pub(crate) fn rule_from_json(value: &JsonValue) -> Result<Box<dyn Rule>> {
    let kind = value
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::Interchange(String::from("rule without a `type`")))?;

    let symbol_field = |field: &str| -> Result<Symbol> {
        value
            .get(field)
            .ok_or_else(|| Error::Interchange(format!("rule without a `{field}` symbol")))
            .and_then(Symbol::from_value)
    };
    let symbol_list = |field: &str| -> Result<Vec<Symbol>> {
        value
            .get(field)
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::Interchange(format!("rule without a `{field}` symbol list")))?
            .iter()
            .map(Symbol::from_value)
            .collect()
    };

    let rule: Box<dyn Rule> = match kind {
        "nurikabe" => Box::new(Nurikabe::new(symbol_field("white")?, symbol_field("black")?)),
        "notwobytwosquare" => Box::new(NoTwoByTwoSquare::new(symbol_field("symbol")?)),
        "singleconnectedregion" => Box::new(SingleConnectedRegion::new(symbol_field("symbol")?)),
        "regionsizesequalnumbers" => {
            Box::new(RegionSizesEqualNumbers::new(symbol_field("symbol")?))
        }
        "implicates" => Box::new(Implicates::new(
            symbol_list("subset")?,
            symbol_list("superset")?,
        )),
        "superrule" => {
            let description = value
                .get("description")
                .and_then(JsonValue::as_str)
                .unwrap_or_default();
            let subrules = value
                .get("rules")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| Error::Interchange(String::from("superrule without a `rules` array")))?
                .iter()
                .map(rule_from_json)
                .collect::<Result<Vec<_>>>()?;
            Box::new(SuperRule::new(description, subrules))
        }
        other => return Err(Error::UnknownRuleType(other.to_string())),
    };
    Ok(rule)
}

fn str_field<'a>(
    fields: &'a HashMap<String, Value>,
    field: &str,
    expected: &'static str,
) -> Result<&'a str> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .ok_or(Error::BadField {
            field: field.to_string(),
            expected,
        })
}

fn dim_field(fields: &HashMap<String, Value>, field: &str) -> Result<Dimension> {
    fields
        .get(field)
        .and_then(Value::as_int)
        .and_then(|raw| usize::try_from(raw).ok())
        .and_then(NonZero::new)
        .ok_or(Error::BadField {
            field: field.to_string(),
            expected: "a positive integer",
        })
}

/// A symbol short name; numeral names arrive integer-coerced, so both
/// string and integer values are accepted.
fn one_symbol_name(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Int(n) => Ok(n.to_string()),
        _ => Err(Error::BadField {
            field: field.to_string(),
            expected: "a symbol short name",
        }),
    }
}

/// One name or a list of names, normalized to a list.
fn symbol_names(value: &Value, field: &str) -> Result<Vec<String>> {
    match value {
        Value::List(items) => items
            .iter()
            .map(|item| one_symbol_name(item, field))
            .collect(),
        scalar => Ok(vec![one_symbol_name(scalar, field)?]),
    }
}

fn optional_symbol(
    fields: &HashMap<String, Value>,
    field: &str,
    table: &SymbolTable,
) -> Result<Option<Symbol>> {
    match fields.get(field) {
        Some(value) => {
            let name = one_symbol_name(value, field)?;
            Ok(Some(table.lookup(&name)?.clone()))
        }
        None => Ok(None),
    }
}

fn required_symbol(
    fields: &HashMap<String, Value>,
    field: &str,
    table: &SymbolTable,
) -> Result<Symbol> {
    optional_symbol(fields, field, table)?.ok_or(Error::BadField {
        field: field.to_string(),
        expected: "a symbol short name",
    })
}
