//! The tokenizer and field-parser pipeline for the puzzle text DSL.
//!
//! Raw text becomes a flat token stream, then a brace-nested token tree,
//! then one field dictionary per puzzle block. The field dictionaries are
//! untyped [`Value`]s; lowering them into typed objects is the
//! constructor's job.

use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::value::Value;

const COMMENT: char = '%';
const WHITESPACE: [char; 2] = [' ', '\t'];
const BRACES: [char; 2] = ['(', ')'];
const LEFT_BRACE: &str = "(";
const RIGHT_BRACE: &str = ")";

const FLAG_PREFIX: &str = "--";
const IMPLICIT_KEYS: [(char, &str); 1] = [('-', "type")];

/// One node of the nested token tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Token {
    /// A bare string token.
    Atom(String),
    /// Everything between one matched pair of braces.
    Group(Vec<Token>),
}

/// Scan `input` into a flat token stream.
///
/// Space and tab end the current token, braces always stand alone, and
/// `%` comments out the rest of the line.
pub(crate) fn raw_tokens(input: &str) -> Vec<String> {
    let mut out = Vec::new();

    for line in input.lines() {
        let mut token = String::new();
        for char in line.chars() {
            if WHITESPACE.contains(&char) {
                if !token.is_empty() {
                    out.push(std::mem::take(&mut token));
                }
            } else if BRACES.contains(&char) {
                if !token.is_empty() {
                    out.push(std::mem::take(&mut token));
                }
                out.push(char.to_string());
            } else if char == COMMENT {
                break;
            } else {
                token.push(char);
            }
        }
        if !token.is_empty() {
            out.push(token);
        }
    }

    out
}

/// Nest the flat token stream by matching braces.
///
/// Uses a stack of start offsets into the output: `(` records the current
/// length, `)` splices everything emitted since the matching offset into
/// one [`Token::Group`].
pub(crate) fn nested_tokens(input: &str) -> Result<Vec<Token>> {
    let tokens = raw_tokens(input);
    debug!("tokenized {} raw tokens", tokens.len());

    let mut out: Vec<Token> = Vec::new();
    let mut left_idxs: Vec<usize> = Vec::new();
    for (idx, token) in tokens.into_iter().enumerate() {
        match token.as_str() {
            LEFT_BRACE => left_idxs.push(out.len()),
            RIGHT_BRACE => {
                let start = left_idxs
                    .pop()
                    .ok_or(Error::UnmatchedCloseBrace { index: idx })?;
                let group = out.split_off(start);
                out.push(Token::Group(group));
            }
            _ => out.push(Token::Atom(token)),
        }
    }
    if !left_idxs.is_empty() {
        return Err(Error::UnmatchedOpenBrace);
    }

    Ok(out)
}

/// A composable parser for one field's token shape.
///
/// `parse` maps [`parse_one`](Self::parse_one) over a token list (the
/// dictionary variant instead accumulates entries into one map); the
/// other variants define how a single token becomes a [`Value`].
pub(crate) enum FieldParser {
    /// Tokens pass through structurally unchanged.
    Literal,
    /// Like [`Literal`](Self::Literal), with int-then-float coercion of atoms.
    Base,
    /// A dash-joined symbol tuple; `_` segments are dropped.
    State,
    /// Applies the inner parser to each element.
    List(Box<FieldParser>),
    /// Key/value entries; a per-key custom parser may override the default.
    Dict {
        default: Box<FieldParser>,
        custom: Vec<(&'static str, FieldParser)>,
    },
}

fn literal(token: &Token) -> Value {
    match token {
        Token::Atom(s) => Value::Str(s.clone()),
        Token::Group(items) => Value::List(items.iter().map(literal).collect()),
    }
}

fn coerce(token: &str) -> Value {
    if let Ok(int) = token.parse::<i64>() {
        return Value::Int(int);
    }
    if let Ok(float) = token.parse::<f64>() {
        return Value::Float(float);
    }
    Value::Str(token.to_string())
}

impl FieldParser {
    /// Parse a token list; the family operation.
    pub(crate) fn parse(&self, tokens: &[Token]) -> Result<Value> {
        if let Self::Dict { default, custom } = self {
            let mut map = HashMap::new();
            for token in tokens {
                Self::parse_entry(token, default, custom, &mut map)?;
            }
            return Ok(Value::Dict(map));
        }

        tokens
            .iter()
            .map(|token| self.parse_one(token))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    /// Parse a lone token, delegating scalars past the list mapping.
    pub(crate) fn parse_single(&self, token: &Token) -> Result<Value> {
        if let Self::Dict { default, custom } = self {
            let mut map = HashMap::new();
            Self::parse_entry(token, default, custom, &mut map)?;
            return Ok(Value::Dict(map));
        }
        self.parse_one(token)
    }

    fn parse_one(&self, token: &Token) -> Result<Value> {
        match self {
            Self::Literal => Ok(literal(token)),
            Self::Base => Ok(match token {
                Token::Atom(s) => coerce(s),
                group => literal(group),
            }),
            Self::State => match token {
                Token::Atom(s) => Ok(Value::List(
                    s.split('-')
                        .filter(|segment| *segment != "_")
                        .map(|segment| Value::Str(segment.to_string()))
                        .collect(),
                )),
                Token::Group(_) => Err(Error::NestedState),
            },
            Self::List(sub) => match token {
                Token::Group(items) => sub.parse(items),
                atom => sub.parse_single(atom),
            },
            Self::Dict { .. } => self.parse_single(token),
        }
    }

    fn parse_entry(
        token: &Token,
        default: &FieldParser,
        custom: &[(&'static str, FieldParser)],
        map: &mut HashMap<String, Value>,
    ) -> Result<()> {
        match token {
            Token::Atom(s) => {
                let marker = s.chars().next();
                let key = marker
                    .and_then(|m| IMPLICIT_KEYS.iter().find(|(candidate, _)| *candidate == m))
                    .map(|(_, key)| *key)
                    .ok_or_else(|| Error::MissingImplicitKey(s.clone()))?;
                // the remainder is taken verbatim, no coercion
                map.insert(key.to_string(), Value::Str(s[1..].to_string()));
                Ok(())
            }
            Token::Group(items) => {
                if items.len() < 2 {
                    return Err(Error::BadAssignment);
                }
                let key = match &items[0] {
                    Token::Atom(s) => s.clone(),
                    Token::Group(_) => return Err(Error::NonAtomKey),
                };
                let rest = &items[1..];

                let parser = custom
                    .iter()
                    .find(|(candidate, _)| *candidate == key)
                    .map(|(_, parser)| parser)
                    .unwrap_or(default);
                let value = match rest.len() {
                    // a single value is unwrapped to a scalar
                    1 => parser.parse_single(&rest[0])?,
                    _ => parser.parse(rest)?,
                };
                map.insert(key, value);
                Ok(())
            }
        }
    }
}

struct FlagSpec {
    name: &'static str,
    smart_wrap: bool,
    parser: FieldParser,
}

fn dict_of_base() -> FieldParser {
    FieldParser::Dict {
        default: Box::new(FieldParser::Base),
        custom: Vec::new(),
    }
}

/// The compile-time flag table; unknown flags are the single error path.
fn flag_spec(flag: &str) -> Option<FlagSpec> {
    let spec = match flag {
        "--grid" => FlagSpec {
            name: "grid",
            smart_wrap: true,
            parser: dict_of_base(),
        },
        "--vertices" => FlagSpec {
            name: "vertices",
            smart_wrap: true,
            parser: FieldParser::Dict {
                default: Box::new(FieldParser::Base),
                custom: vec![("data", FieldParser::State)],
            },
        },
        "--rules" => FlagSpec {
            name: "rules",
            smart_wrap: false,
            parser: FieldParser::List(Box::new(dict_of_base())),
        },
        "--symbols" => FlagSpec {
            name: "symbols",
            smart_wrap: false,
            parser: FieldParser::List(Box::new(FieldParser::Literal)),
        },
        "--editlayers" => FlagSpec {
            name: "editlayers",
            smart_wrap: false,
            parser: FieldParser::List(Box::new(dict_of_base())),
        },
        _ => return None,
    };
    Some(spec)
}

fn add_field(out: &mut HashMap<String, Value>, spec: FlagSpec, expr: &[Token]) -> Result<()> {
    // an explicit brace pair around the whole value stands in for the
    // implicit wrapping these flags apply, so it is removed
    let expr = match expr {
        [Token::Group(items)] if spec.smart_wrap => items.as_slice(),
        other => other,
    };
    let value = spec.parser.parse(expr)?;
    out.insert(spec.name.to_string(), value);
    Ok(())
}

/// Scan one puzzle block's tokens into a field dictionary.
///
/// Tokens between two `--` flags belong to the preceding flag; flag names
/// match case-insensitively.
pub(crate) fn parse_puzzle(tokens: &[Token]) -> Result<HashMap<String, Value>> {
    let mut out = HashMap::new();

    let mut start_ptr = 0;
    let mut last_flag: Option<FlagSpec> = None;
    for (ptr, token) in tokens.iter().enumerate() {
        let Token::Atom(word) = token else { continue };
        if !word.starts_with(FLAG_PREFIX) {
            continue;
        }
        let flag = word.to_lowercase();
        let spec = flag_spec(&flag).ok_or(Error::UnknownFlag(flag))?;

        if let Some(prev) = last_flag.take() {
            add_field(&mut out, prev, &tokens[start_ptr + 1..ptr])?;
        }
        start_ptr = ptr;
        last_flag = Some(spec);
    }

    match last_flag {
        None => Err(Error::NoFlags),
        Some(prev) => {
            add_field(&mut out, prev, &tokens[start_ptr + 1..])?;
            Ok(out)
        }
    }
}

/// Parse a whole text file into one field dictionary per puzzle block.
pub(crate) fn parse_txt(input: &str) -> Result<Vec<HashMap<String, Value>>> {
    nested_tokens(input)?
        .iter()
        .map(|entry| match entry {
            Token::Group(tokens) => parse_puzzle(tokens),
            Token::Atom(stray) => Err(Error::StrayToken(stray.clone())),
        })
        .collect()
}
