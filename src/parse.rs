//! RFC 3986 grammar engine.
//!
//! Every production is a [`Rule`]: a pure function from a [`Reader`] position to
//! either an output and a new position, or a [`ParseError`] located at the
//! offending byte. Rules never hold state of their own, so they can be run
//! concurrently on the same input and re-run from the same position with the
//! same result.
//!
//! The compositor functions ([`parse_uri`], [`parse_relative_ref`],
//! [`parse_uri_reference`], [`parse_hier_part`] and [`parse_authority`])
//! assemble the rules into the full grammar and require the whole input to
//! be consumed.
//!
//! # Examples
//!
//! ```
//! use uri_splice::parse::{self, HostKind};
//!
//! let parsed = parse::parse_hier_part(b"//1.2.3.4:8080////")?;
//! let auth = parsed.authority().unwrap();
//! assert!(matches!(auth.host.kind, HostKind::Ipv4(_)));
//! assert_eq!(auth.port.unwrap().get(parsed.input()), b"8080");
//! assert_eq!(parsed.path().count(), 4);
//! # Ok::<_, uri_splice::ParseError>(())
//! ```

mod combinator;
mod rules;

pub use combinator::{LazyIter, LazyRange, Located, Optional};
pub use rules::{
    Fragment, Host, HostKind, HostParts, ParamSpans, PctEncoded, PctSpan, Port, QueryParam,
    Scheme, Segment, Userinfo,
};

use crate::{
    error::{ParseError, ParseErrorKind},
    pct_enc::{self, table::*, Table},
};
use core::ops::Range;

pub(crate) type Result<T> = core::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident, $rule:expr) => {
        return Err(crate::error::ParseError {
            index: $index,
            kind: crate::error::ParseErrorKind::$kind,
            rule: $rule,
        })
    };
}

pub(crate) use err;

/// A half-open byte span `[start, end)` into some input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// The index of the first byte.
    pub start: usize,
    /// The index one past the last byte.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Checks whether the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns the bytes of `input` covered by the span.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of the bounds of `input`.
    #[must_use]
    pub fn get(self, input: &[u8]) -> &[u8] {
        &input[self.range()]
    }

    /// Converts the span into a range.
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// A grammar production.
pub trait Rule {
    /// The structured result of a successful parse.
    type Output;

    /// The name of the production, reported by [`ParseError::rule`].
    const NAME: &'static str;

    /// Parses the production at the current position of the reader.
    ///
    /// On success, the reader is left right after the production.
    /// On failure, the position of the reader is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the input does not match the production.
    fn parse(r: &mut Reader<'_>) -> Result<Self::Output>;
}

/// A production that repeats inside a [`LazyRange`], each repetition
/// being introduced by a one-byte delimiter.
pub trait Element: Rule {
    /// The delimiter separating two repetitions.
    const DELIM: u8;
}

/// A cursor over an immutable byte range.
///
/// # Invariants
///
/// `pos <= len` and `pos` is non-decreasing while a rule runs.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `bytes`.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::at(bytes, 0)
    }

    /// Creates a reader positioned at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is greater than the length of `bytes`.
    #[must_use]
    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        assert!(pos <= bytes.len(), "position out of bounds");
        Self { bytes, pos }
    }

    /// Returns the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the whole input.
    #[must_use]
    pub fn input(&self) -> &'a [u8] {
        self.bytes
    }

    /// Checks whether there are bytes left to read.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.pos < self.bytes.len()
    }

    pub(crate) fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    pub(crate) fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.bytes.len());
    }

    pub(crate) fn reset(&mut self, pos: usize) {
        debug_assert!(pos <= self.bytes.len());
        self.pos = pos;
    }

    pub(crate) fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            // INVARIANT: The remaining bytes start with `s` so it's fine to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    /// Reads as many bytes allowed by the table as possible.
    pub(crate) fn read_encoded(&mut self, table: Table, rule: &'static str) -> Result<PctSpan> {
        let start = self.pos;
        let mut i = self.pos;
        let mut encoded = false;

        while i < self.bytes.len() {
            let x = self.bytes[i];
            if table.allows_pct_encoded() && x == b'%' {
                let [hi, lo, ..] = self.bytes[i + 1..] else {
                    err!(i, InvalidPercentEncoding, rule);
                };
                if !pct_enc::is_hexdig_pair(hi, lo) {
                    err!(i, InvalidPercentEncoding, rule);
                }
                encoded = true;
                i += 3;
            } else if table.allows(x) {
                i += 1;
            } else {
                break;
            }
        }

        // INVARIANT: `i` is non-decreasing.
        self.pos = i;
        Ok(PctSpan {
            span: Span::new(start, i),
            encoded,
        })
    }

    // Returns `true` iff any byte is read.
    pub(crate) fn read(&mut self, table: Table, rule: &'static str) -> Result<bool> {
        self.read_encoded(table, rule).map(|s| !s.span.is_empty())
    }

    fn expect_end(&self, rule: &'static str) -> Result<()> {
        if self.has_remaining() {
            err!(self.pos, UnexpectedChar, rule);
        }
        Ok(())
    }
}

/// Runs a rule at `pos` and returns the position right after it along with its output.
///
/// # Errors
///
/// Returns `Err` if the input does not match the rule at `pos`.
///
/// # Panics
///
/// Panics if `pos` is greater than the length of `input`.
pub fn parse_at<R: Rule>(input: &[u8], pos: usize) -> Result<(usize, R::Output)> {
    let mut r = Reader::at(input, pos);
    let out = R::parse(&mut r)?;
    Ok((r.pos(), out))
}

/// Runs a rule over the whole input.
///
/// # Errors
///
/// Returns `Err` if the input does not match the rule or if any byte is left unconsumed.
pub fn parse_all<R: Rule>(input: &[u8]) -> Result<R::Output> {
    let mut r = Reader::new(input);
    let out = R::parse(&mut r)?;
    r.expect_end(R::NAME)?;
    Ok(out)
}

/// The parsed authority component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorityParts {
    /// The whole authority, without the leading `"//"`.
    pub span: Span,
    /// The userinfo subcomponent, without the trailing `"@"`.
    pub userinfo: Option<PctSpan>,
    /// The host subcomponent.
    pub host: HostParts,
    /// The port subcomponent, without the leading `":"`.
    ///
    /// `Some` with an empty span for an authority such as `"example.com:"`.
    pub port: Option<Span>,
}

/// `authority = [ userinfo "@" ] host [ ":" port ]`
#[derive(Clone, Copy, Debug)]
pub struct Authority(());

/// `userinfo "@"`
struct UserinfoAt;

impl Rule for UserinfoAt {
    type Output = PctSpan;
    const NAME: &'static str = "userinfo";

    fn parse(r: &mut Reader<'_>) -> Result<PctSpan> {
        let userinfo = Userinfo::parse(r)?;
        if !r.read_str("@") {
            err!(r.pos(), UnexpectedChar, Self::NAME);
        }
        Ok(userinfo)
    }
}

impl Rule for Authority {
    type Output = AuthorityParts;
    const NAME: &'static str = "authority";

    fn parse(r: &mut Reader<'_>) -> Result<AuthorityParts> {
        let start = r.pos();
        let userinfo = Optional::<UserinfoAt>::parse(r)?;
        let host = Host::parse(r)?;
        let port = if r.read_str(":") {
            Some(Port::parse(r)?)
        } else {
            None
        };
        Ok(AuthorityParts {
            span: Span::new(start, r.pos()),
            userinfo,
            host,
            port,
        })
    }
}

/// The structured result of parsing a URI or one of its larger productions.
///
/// Every component is located by a span into [`input`](Self::input).
/// Repeated productions are kept as [`LazyRange`]s and only scanned on demand.
#[derive(Clone, Debug)]
pub struct Parsed<'a> {
    input: &'a [u8],
    scheme: Option<Span>,
    authority: Option<AuthorityParts>,
    path: LazyRange<'a, Segment>,
    query: Option<LazyRange<'a, QueryParam>>,
    fragment: Option<PctSpan>,
}

impl<'a> Parsed<'a> {
    /// Returns the input that was parsed.
    #[must_use]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Returns the span of the scheme, without the trailing `":"`.
    #[must_use]
    pub fn scheme(&self) -> Option<Span> {
        self.scheme
    }

    /// Returns the parsed authority.
    #[must_use]
    pub fn authority(&self) -> Option<&AuthorityParts> {
        self.authority.as_ref()
    }

    /// Returns the path segments.
    ///
    /// The span of the range is the span of the whole path.
    #[must_use]
    pub fn path(&self) -> &LazyRange<'a, Segment> {
        &self.path
    }

    /// Returns the query elements.
    ///
    /// The span of the range includes the leading `"?"`.
    #[must_use]
    pub fn query(&self) -> Option<&LazyRange<'a, QueryParam>> {
        self.query.as_ref()
    }

    /// Returns the span of the fragment, without the leading `"#"`.
    #[must_use]
    pub fn fragment(&self) -> Option<PctSpan> {
        self.fragment
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PathKind {
    // path-abempty
    AbEmpty,
    // path-absolute / path-rootless / path-empty
    General,
    // path-absolute / path-noscheme / path-empty
    NoScheme,
}

struct Compositor<'a> {
    reader: Reader<'a>,
    out: Parsed<'a>,
}

impl<'a> Compositor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(input),
            out: Parsed {
                input,
                scheme: None,
                authority: None,
                path: LazyRange::new(input, Span::default(), false),
                query: None,
                fragment: None,
            },
        }
    }

    fn finish(self, rule: &'static str) -> Result<Parsed<'a>> {
        self.reader.expect_end(rule)?;
        Ok(self.out)
    }

    // URI = scheme ":" hier-part [ "?" query ] [ "#" fragment ]
    fn uri(mut self) -> Result<Parsed<'a>> {
        const NAME: &str = "URI";
        self.out.scheme = Some(Scheme::parse(&mut self.reader)?);
        if !self.reader.read_str(":") {
            err!(self.reader.pos(), UnexpectedChar, NAME);
        }
        self.hier_part()?;
        self.query_and_fragment()?;
        self.finish(NAME)
    }

    // URI-reference = URI / relative-ref
    fn uri_reference(mut self) -> Result<Parsed<'a>> {
        // A scheme is only committed to once it is followed by ":".
        let r = &mut self.reader;
        r.read(SCHEME, Scheme::NAME)?;
        if r.pos() > 0 && r.peek(0) == Some(b':') {
            r.reset(0);
            return self.uri();
        }
        if r.pos() == 0 && r.peek(0) == Some(b':') {
            err!(0, ExpectedScheme, Scheme::NAME);
        }
        r.reset(0);
        self.relative_ref()
    }

    // relative-ref = relative-part [ "?" query ] [ "#" fragment ]
    fn relative_ref(mut self) -> Result<Parsed<'a>> {
        if self.reader.read_str("//") {
            self.authority_and_path()?;
        } else {
            self.path(PathKind::NoScheme)?;
        }
        self.query_and_fragment()?;
        self.finish("relative-ref")
    }

    // hier-part = "//" authority path-abempty
    //           / path-absolute
    //           / path-rootless
    //           / path-empty
    fn hier_part(&mut self) -> Result<()> {
        if self.reader.read_str("//") {
            self.authority_and_path()
        } else {
            self.path(PathKind::General)
        }
    }

    fn authority_and_path(&mut self) -> Result<()> {
        // Committed: a failure inside the authority is final.
        self.out.authority = Some(Authority::parse(&mut self.reader)?);
        self.path(PathKind::AbEmpty)
    }

    fn path(&mut self, kind: PathKind) -> Result<()> {
        const NAME: &str = "path";
        let r = &mut self.reader;
        let start = r.pos();

        match kind {
            PathKind::AbEmpty => {
                if r.peek(0) == Some(b'/') {
                    r.read(PATH, NAME)?;
                }
            }
            PathKind::General => {
                r.read(PATH, NAME)?;
            }
            PathKind::NoScheme => {
                r.read(SEGMENT_NZ_NC, NAME)?;
                if r.peek(0) == Some(b':') {
                    // In a relative reference, the first path
                    // segment cannot contain a colon character.
                    err!(r.pos(), UnexpectedChar, NAME);
                }
                r.read(PATH, NAME)?;
            }
        }

        let span = Span::new(start, r.pos());
        let leading = r.input().get(start) == Some(&b'/');
        self.out.path = LazyRange::new(r.input(), span, leading);
        Ok(())
    }

    fn query_and_fragment(&mut self) -> Result<()> {
        let r = &mut self.reader;
        let start = r.pos();
        if r.read_str("?") {
            r.read(QUERY, QueryParam::NAME)?;
            let span = Span::new(start, r.pos());
            self.out.query = Some(LazyRange::new(r.input(), span, true));
        }

        if r.read_str("#") {
            self.out.fragment = Some(Fragment::parse(r)?);
        }
        Ok(())
    }
}

/// Parses an absolute URI with an optional fragment.
///
/// `URI = scheme ":" hier-part [ "?" query ] [ "#" fragment ]`
///
/// # Errors
///
/// Returns `Err` at the first grammar violation.
pub fn parse_uri(input: &[u8]) -> Result<Parsed<'_>> {
    Compositor::new(input).uri()
}

/// Parses a relative reference.
///
/// `relative-ref = relative-part [ "?" query ] [ "#" fragment ]`
///
/// # Errors
///
/// Returns `Err` at the first grammar violation.
pub fn parse_relative_ref(input: &[u8]) -> Result<Parsed<'_>> {
    Compositor::new(input).relative_ref()
}

/// Parses a URI reference.
///
/// `URI-reference = URI / relative-ref`
///
/// # Errors
///
/// Returns `Err` at the first grammar violation.
pub fn parse_uri_reference(input: &[u8]) -> Result<Parsed<'_>> {
    Compositor::new(input).uri_reference()
}

/// Parses the hierarchical part of a URI alone.
///
/// The result has neither scheme, query nor fragment.
///
/// # Errors
///
/// Returns `Err` at the first grammar violation.
pub fn parse_hier_part(input: &[u8]) -> Result<Parsed<'_>> {
    let mut c = Compositor::new(input);
    c.hier_part()?;
    c.finish("hier-part")
}

/// Parses an authority component alone.
///
/// # Errors
///
/// Returns `Err` at the first grammar violation.
pub fn parse_authority(input: &[u8]) -> Result<AuthorityParts> {
    parse_all::<Authority>(input)
}

impl ParseErrorKind {
    pub(crate) fn description(self) -> &'static str {
        match self {
            Self::ExpectedScheme => "expected scheme",
            Self::InvalidHost => "invalid host",
            Self::InvalidPercentEncoding => "invalid percent-encoded octet",
            Self::UnexpectedChar => "unexpected character or end of input",
        }
    }
}
