use std::collections::HashMap;

/// The untyped intermediate representation the DSL parser produces.
///
/// A closed algebraic type standing in for the loose dictionaries the
/// text format describes; the constructor lowers it into typed grid,
/// symbol, and rule objects.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A bare string token.
    Str(String),
    /// An integer-coerced token.
    Int(i64),
    /// A float-coerced token.
    Float(f64),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string-keyed field dictionary.
    Dict(HashMap<String, Value>),
}

impl Value {
    /// The string inside, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer inside, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The elements inside, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The entries inside, if this is a [`Value::Dict`].
    pub fn as_dict(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }
}
