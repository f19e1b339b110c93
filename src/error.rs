use thiserror::Error;

/// Shorthand for results carrying a crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while parsing puzzle text or constructing
/// a [`Puzzle`](crate::Puzzle) from it.
///
/// Rule checks failing is *not* an error; see [`Verdict`](crate::Verdict).
#[derive(Debug, Error)]
pub enum Error {
    /// A `)` with no matching `(` appeared in the input.
    #[error("unmatched close brace at token #{index}")]
    UnmatchedCloseBrace {
        /// Index of the offending token in the flat token stream.
        index: usize,
    },
    /// A `(` was still open when the input ended.
    #[error("unmatched open brace at end of input")]
    UnmatchedOpenBrace,
    /// A bare token appeared at the top level, outside any puzzle block.
    #[error("expected a brace-wrapped puzzle block, found `{0}`")]
    StrayToken(String),
    /// A puzzle block contained no `--` flags at all.
    #[error("no flags found in puzzle block")]
    NoFlags,
    /// A `--` token did not name a known puzzle flag.
    #[error("puzzle flag `{0}` not recognized")]
    UnknownFlag(String),
    /// A bare dictionary entry did not start with an implicit key marker.
    #[error("no implicit key found for `{0}`")]
    MissingImplicitKey(String),
    /// A braced dictionary entry was too short to hold a key and a value.
    #[error("assignment requires a key and at least one value")]
    BadAssignment,
    /// A braced dictionary entry used a nested group as its key.
    #[error("dictionary keys must be plain tokens")]
    NonAtomKey,
    /// The state parser was handed a nested group instead of a plain token.
    #[error("states cannot be nested")]
    NestedState,
    /// The parsed puzzle dictionary is missing its required `grid` field.
    #[error("puzzle requires a `grid` field")]
    MissingGrid,
    /// A grid `type` did not match any entry in the grid dispatch table.
    #[error("`{0}` is not a known grid type")]
    UnknownGridType(String),
    /// A rule `type` did not match any entry in the rule dispatch table.
    #[error("`{0}` is not a known rule type")]
    UnknownRuleType(String),
    /// A symbol short name missed the symbol table.
    #[error("no symbol registered under `{0}`")]
    UnknownSymbol(String),
    /// A `vertices` field named an encoding scheme the grid does not know.
    #[error("invalid vertex encoding scheme `{0}`")]
    UnknownEncoding(String),
    /// Positional vertex data did not line up with the grid.
    #[error("vertex data holds {got} entries but the grid has {want} vertices")]
    VertexCountMismatch {
        /// Entries present in the `data` field.
        got: usize,
        /// Vertices in the grid being seeded.
        want: usize,
    },
    /// A `vertices` field arrived without its `data` subfield.
    #[error("vertices require a `data` field")]
    MissingVertexData,
    /// An edit layer arrived without a usable `symbols` list.
    #[error("edit layers require a non-empty `symbols` list")]
    EmptyEditLayer,
    /// A field held a value of the wrong shape for its consumer.
    #[error("field `{field}` expects {expected}")]
    BadField {
        /// Name of the offending field.
        field: String,
        /// What the consumer wanted to find there.
        expected: &'static str,
    },
    /// Serialized puzzle data could not be reconstructed.
    #[error("malformed interchange data: {0}")]
    Interchange(String),
}
