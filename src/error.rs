use thiserror::Error;

/// What went wrong in a [`ParseError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// The first byte of a scheme is not a letter. Points at that byte.
    ExpectedScheme,
    /// The text inside `[` and `]` is neither an IPv6 address nor `IPvFuture`.
    /// Points right after the `[`.
    InvalidHost,
    /// A `%` is not followed by two hexadecimal digits. Points at the `%`.
    InvalidPercentEncoding,
    /// A byte the grammar does not allow here, or a premature end of input.
    /// Points at the byte or at the end.
    UnexpectedChar,
}

/// Failure to parse a URI reference or one of its productions.
///
/// Nothing is returned or modified on failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("{kind} in {rule} at index {index}")]
pub struct ParseError {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
    pub(crate) rule: &'static str,
}

impl ParseError {
    /// Byte offset of the failure within the input.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Returns the name of the innermost grammar production that failed,
    /// such as `"host"` or `"query"`.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        self.rule
    }
}

/// Failure to decode a byte sequence with [`pct_enc::decode`](crate::pct_enc::decode).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("invalid percent-encoded octet at index {index}")]
pub struct DecodeError {
    pub(crate) index: usize,
}

impl DecodeError {
    /// Returns the index of the `"%"` starting the malformed octet.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An error returned by position-based accessors of the query and path views.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("index {index} out of range for a view of {len} elements")]
pub struct OutOfRange {
    pub(crate) index: usize,
    pub(crate) len: usize,
}

impl OutOfRange {
    /// Returns the index that was requested.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of elements in the view at the time of the request.
    #[must_use]
    pub fn view_len(&self) -> usize {
        self.len
    }
}
