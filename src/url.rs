use crate::{
    error::ParseError,
    params::{Params, ParamsMut},
    parse::{self, HostKind, Parsed},
    pct_enc::{
        encoder::{Fragment, Path, Query, Userinfo},
        EStr, EString,
    },
    segments::{Segments, SegmentsMut},
};
use alloc::string::String;
use core::{
    num::ParseIntError,
    ops::{Index, IndexMut, Range},
    str::FromStr,
};

/// A top-level component or an authority subcomponent of a URI.
///
/// The parts are listed in the order in which they appear in a URI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    /// The scheme, including the trailing `":"`.
    Scheme,
    /// The `"//"` authority marker, followed by the userinfo and its trailing `"@"` if any.
    Userinfo,
    /// The host.
    Host,
    /// The port, including the leading `":"`.
    Port,
    /// The path.
    Path,
    /// The query, including the leading `"?"`.
    Query,
    /// The fragment, including the leading `"#"`.
    Fragment,
}

/// The length of every part, in order.
///
/// The offset of a part is the sum of the lengths of all parts before it,
/// so an edit inside a part only ever changes the length of that part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct PartsTable([usize; 7]);

impl PartsTable {
    fn offset(&self, part: Part) -> usize {
        self.0[..part as usize].iter().sum()
    }

    fn range(&self, part: Part) -> Range<usize> {
        let start = self.offset(part);
        start..start + self[part]
    }

    fn total(&self) -> usize {
        self.0.iter().sum()
    }

    fn from_parsed(p: &Parsed<'_>) -> Self {
        // Absolute boundaries between consecutive parts.
        let mut bounds = [0; 8];
        bounds[1] = p.scheme().map_or(0, |s| s.end + 1);
        match p.authority() {
            Some(auth) => {
                bounds[2] = auth.host.span.start;
                bounds[3] = auth.host.span.end;
                bounds[4] = auth.span.end;
            }
            None => {
                let end = bounds[1];
                bounds[2..5].fill(end);
            }
        }
        bounds[5] = p.path().span().end;
        bounds[6] = p.query().map_or(bounds[5], |q| q.span().end);
        bounds[7] = p.input().len();

        let mut table = Self::default();
        for (i, len) in table.0.iter_mut().enumerate() {
            *len = bounds[i + 1] - bounds[i];
        }
        table
    }
}

impl Index<Part> for PartsTable {
    type Output = usize;

    fn index(&self, part: Part) -> &usize {
        &self.0[part as usize]
    }
}

impl IndexMut<Part> for PartsTable {
    fn index_mut(&mut self, part: Part) -> &mut usize {
        &mut self.0[part as usize]
    }
}

#[cold]
#[track_caller]
fn consistency_fault(buf_len: usize, parts_len: usize) -> ! {
    panic!("parts table out of sync: buffer holds {buf_len} bytes but parts sum to {parts_len}");
}

/// A mutable URI reference backed by a single contiguous buffer.
///
/// A `Url` owns its text and a table of part lengths. Every edit, from
/// [`set_port`](Self::set_port) to an insertion through [`params_mut`](Self::params_mut),
/// boils down to a single splice of the buffer followed by an update of the
/// length of the part that contains it.
///
/// The text of a `Url` always matches the `URI-reference` rule of RFC 3986,
/// and is never normalized.
///
/// # Examples
///
/// ```
/// use uri_splice::Url;
///
/// let mut url = Url::parse("http://example.com/a/b?x=1")?;
/// url.params_mut().push_back(("y", "2 3"));
/// url.segments_mut().pop_back();
/// url.set_port(Some(8080));
/// assert_eq!(url.as_str(), "http://example.com:8080/a?x=1&y=2%203");
/// # Ok::<_, uri_splice::ParseError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Url {
    buf: String,
    parts: PartsTable,
}

impl Url {
    /// Parses a URI reference.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the `URI-reference` rule.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let parsed = parse::parse_uri_reference(s.as_bytes())?;
        Ok(Self::from_parsed(&parsed))
    }

    /// Creates a URI with the given scheme and every other part empty,
    /// such as `"mailto:"`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the `scheme` rule.
    pub fn with_scheme(scheme: &str) -> Result<Self, ParseError> {
        parse::parse_all::<parse::Scheme>(scheme.as_bytes())?;
        let mut parts = PartsTable::default();
        parts[Part::Scheme] = scheme.len() + 1;
        Ok(Self {
            buf: [scheme, ":"].concat(),
            parts,
        })
    }

    /// Copies the text of a successful parse into a new `Url`.
    ///
    /// The parse is trusted and not validated again.
    #[must_use]
    pub fn from_parsed(parsed: &Parsed<'_>) -> Self {
        // Every byte accepted by the grammar is ASCII.
        let buf = String::from_utf8_lossy(parsed.input()).into_owned();
        let url = Self {
            parts: PartsTable::from_parsed(parsed),
            buf,
        };
        url.check_consistency();
        url
    }

    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Returns the raw text of a part, including its delimiters.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_splice::{Part, Url};
    ///
    /// let url = Url::parse("foo://user@host:8042/over?name=x#nose")?;
    /// assert_eq!(url.part(Part::Scheme), "foo:");
    /// assert_eq!(url.part(Part::Userinfo), "//user@");
    /// assert_eq!(url.part(Part::Port), ":8042");
    /// assert_eq!(url.part(Part::Query), "?name=x");
    /// # Ok::<_, uri_splice::ParseError>(())
    /// ```
    #[must_use]
    pub fn part(&self, part: Part) -> &str {
        &self.buf[self.parts.range(part)]
    }

    /// Returns the length of a part, including its delimiters.
    #[must_use]
    pub fn part_len(&self, part: Part) -> usize {
        self.parts[part]
    }

    /// Returns the byte offset at which a part starts.
    #[must_use]
    pub fn part_offset(&self, part: Part) -> usize {
        self.parts.offset(part)
    }

    /// Returns the scheme, without the trailing `":"`.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.part(Part::Scheme).strip_suffix(':')
    }

    /// Returns the authority, without the leading `"//"`.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        if !self.has_authority() {
            return None;
        }
        let start = self.parts.offset(Part::Userinfo) + 2;
        Some(&self.buf[start..self.parts.offset(Part::Path)])
    }

    /// Returns the userinfo subcomponent, without the trailing `"@"`.
    #[must_use]
    pub fn userinfo(&self) -> Option<&EStr<Userinfo>> {
        let s = self.part(Part::Userinfo).strip_prefix("//")?;
        s.strip_suffix('@').map(EStr::new_validated)
    }

    /// Returns the host subcomponent.
    ///
    /// An IP literal is returned with its square brackets.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.has_authority().then(|| self.part(Part::Host))
    }

    /// Classifies the host subcomponent.
    #[must_use]
    pub fn host_kind(&self) -> Option<HostKind> {
        let host = self.host()?;
        parse::parse_all::<parse::Host>(host.as_bytes())
            .ok()
            .map(|h| h.kind)
    }

    /// Returns the port subcomponent, without the leading `":"`.
    ///
    /// The port may be empty, as in `"http://localhost:/"`.
    #[must_use]
    pub fn port(&self) -> Option<&str> {
        self.part(Part::Port).strip_prefix(':')
    }

    /// Converts the port subcomponent to `u16`.
    ///
    /// Leading zeros are ignored.
    /// Returns `Ok(None)` if the port is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the port cannot be represented as `u16`.
    pub fn port_to_u16(&self) -> Result<Option<u16>, ParseIntError> {
        self.port()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse())
            .transpose()
    }

    /// Returns the path component.
    ///
    /// The path is always present, though it may be empty. Without an
    /// authority it may start with a `"/."` that [`segments`](Self::segments)
    /// skips.
    #[must_use]
    pub fn path(&self) -> &EStr<Path> {
        EStr::new_validated(self.part(Part::Path))
    }

    /// Returns the query component, without the leading `"?"`.
    #[must_use]
    pub fn query(&self) -> Option<&EStr<Query>> {
        self.part(Part::Query)
            .strip_prefix('?')
            .map(EStr::new_validated)
    }

    /// Returns the fragment component, without the leading `"#"`.
    #[must_use]
    pub fn fragment(&self) -> Option<&EStr<Fragment>> {
        self.part(Part::Fragment)
            .strip_prefix('#')
            .map(EStr::new_validated)
    }

    /// Checks whether a scheme is present.
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        self.parts[Part::Scheme] != 0
    }

    /// Checks whether an authority is present.
    #[must_use]
    pub fn has_authority(&self) -> bool {
        self.parts[Part::Userinfo] >= 2
    }

    /// Checks whether a userinfo subcomponent is present.
    #[must_use]
    pub fn has_userinfo(&self) -> bool {
        self.parts[Part::Userinfo] > 2
    }

    /// Checks whether a port subcomponent is present.
    #[must_use]
    pub fn has_port(&self) -> bool {
        self.parts[Part::Port] != 0
    }

    /// Checks whether a query is present.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.parts[Part::Query] != 0
    }

    /// Checks whether a fragment is present.
    #[must_use]
    pub fn has_fragment(&self) -> bool {
        self.parts[Part::Fragment] != 0
    }

    /// Sets the scheme.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the `scheme` rule,
    /// in which case the URI is left unchanged.
    pub fn set_scheme(&mut self, scheme: &str) -> Result<(), ParseError> {
        parse::parse_all::<parse::Scheme>(scheme.as_bytes())?;
        let range = self.parts.range(Part::Scheme);
        self.splice(Part::Scheme, range, &[scheme, ":"].concat());
        Ok(())
    }

    /// Sets or removes the port subcomponent.
    ///
    /// # Panics
    ///
    /// Panics if no authority is present.
    pub fn set_port(&mut self, port: Option<u16>) {
        assert!(self.has_authority(), "cannot set port without authority");
        let range = self.parts.range(Part::Port);
        match port {
            Some(port) => self.splice(Part::Port, range, &alloc::format!(":{port}")),
            None => self.splice(Part::Port, range, ""),
        }
    }

    /// Sets the fragment, percent-encoding the given text where needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_splice::Url;
    ///
    /// let mut url = Url::parse("/doc")?;
    /// url.set_fragment("section 2");
    /// assert_eq!(url.as_str(), "/doc#section%202");
    /// # Ok::<_, uri_splice::ParseError>(())
    /// ```
    pub fn set_fragment(&mut self, fragment: &str) {
        let mut buf = EString::<Fragment>::with_capacity(fragment.len());
        buf.encode_str::<Fragment>(fragment);
        let range = self.parts.range(Part::Fragment);
        self.splice(Part::Fragment, range, &["#", buf.as_str()].concat());
    }

    /// Removes the fragment.
    pub fn remove_fragment(&mut self) {
        let range = self.parts.range(Part::Fragment);
        self.splice(Part::Fragment, range, "");
    }

    /// Removes the query.
    pub fn remove_query(&mut self) {
        let range = self.parts.range(Part::Query);
        self.splice(Part::Query, range, "");
    }

    /// Returns a read-only view of the query as a sequence of key-value elements.
    #[must_use]
    pub fn params(&self) -> &Params {
        Params::new(self)
    }

    /// Returns a mutable view of the query as a sequence of key-value elements.
    pub fn params_mut(&mut self) -> &mut ParamsMut {
        ParamsMut::new(self)
    }

    /// Returns a read-only view of the path as a sequence of segments.
    #[must_use]
    pub fn segments(&self) -> &Segments {
        Segments::new(self)
    }

    /// Returns a mutable view of the path as a sequence of segments.
    pub fn segments_mut(&mut self) -> &mut SegmentsMut {
        SegmentsMut::new(self)
    }

    /// Reserves capacity for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    /// Returns the capacity of the underlying buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Consumes the `Url` and yields the underlying `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }

    pub(crate) fn range(&self, part: Part) -> Range<usize> {
        self.parts.range(part)
    }

    /// Replaces `range` of the buffer with `s` and accounts the change to `part`.
    ///
    /// `range` must lie within `part`, its end included.
    pub(crate) fn splice(&mut self, part: Part, range: Range<usize>, s: &str) {
        debug_assert!({
            let bounds = self.parts.range(part);
            bounds.start <= range.start && range.end <= bounds.end
        });

        let removed = range.len();
        // The capacity is never shrunk.
        self.buf.replace_range(range, s);
        self.parts[part] = self.parts[part] - removed + s.len();
        self.check_consistency();
    }

    fn check_consistency(&self) {
        let total = self.parts.total();
        if total != self.buf.len() {
            consistency_fault(self.buf.len(), total);
        }
    }
}

impl FromStr for Url {
    type Err = ParseError;

    /// Equivalent to [`Url::parse`].
    fn from_str(s: &str) -> Result<Self, ParseError> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Url {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, ParseError> {
        Self::parse(s)
    }
}

impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl From<Url> for String {
    fn from(url: Url) -> String {
        url.into_string()
    }
}

impl PartialEq<str> for Url {
    fn eq(&self, other: &str) -> bool {
        self.buf == other
    }
}

impl PartialEq<&str> for Url {
    fn eq(&self, other: &&str) -> bool {
        self.buf == *other
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Url;
    use alloc::string::String;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Url {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> Deserialize<'de> for Url {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Url::parse(&s).map_err(|e| {
                de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lens(url: &Url) -> [usize; 7] {
        [
            Part::Scheme,
            Part::Userinfo,
            Part::Host,
            Part::Port,
            Part::Path,
            Part::Query,
            Part::Fragment,
        ]
        .map(|p| url.part_len(p))
    }

    #[test]
    fn parts_from_parse() {
        let url = Url::parse("foo://user@example.com:8042/over/there?name=ferret#nose").unwrap();
        assert_eq!(lens(&url), [4, 7, 11, 5, 11, 12, 5]);

        let url = Url::parse("urn:example:animal:ferret:nose").unwrap();
        assert_eq!(lens(&url), [4, 0, 0, 0, 26, 0, 0]);

        let url = Url::parse("//[::1]").unwrap();
        assert_eq!(lens(&url), [0, 2, 5, 0, 0, 0, 0]);

        let url = Url::parse("?#").unwrap();
        assert_eq!(lens(&url), [0, 0, 0, 0, 0, 1, 1]);

        let url = Url::parse("").unwrap();
        assert_eq!(lens(&url), [0; 7]);
    }

    #[test]
    fn parts_without_authority() {
        let url = Url::parse("x:a/b?q#f").unwrap();
        assert_eq!(lens(&url), [2, 0, 0, 0, 3, 2, 2]);
        assert_eq!(url.part_offset(Part::Host), 2);
        assert_eq!(url.part_offset(Part::Path), 2);
        assert_eq!(url.path().as_str(), "a/b");
        assert!(!url.has_authority());

        let url = Url::parse("/a?q").unwrap();
        assert_eq!(lens(&url), [0, 0, 0, 0, 2, 2, 0]);
        assert_eq!(url.part_offset(Part::Query), 2);
    }

    #[test]
    fn parts_from_hier_part() {
        let parsed = parse::parse_hier_part(b"//1.2.3.4:8080////").unwrap();
        let url = Url::from_parsed(&parsed);
        assert_eq!(url.host(), Some("1.2.3.4"));
        assert_eq!(url.port(), Some("8080"));
        assert_eq!(url.path().as_str(), "////");
        assert_eq!(lens(&url), [0, 2, 7, 5, 4, 0, 0]);
    }

    #[test]
    fn splice_keeps_later_parts() {
        let mut url = Url::parse("http://h/p?q#f").unwrap();
        let before = url.part_len(Part::Fragment);
        let range = url.range(Part::Path);
        url.splice(Part::Path, range.start..range.start, "/longer");
        assert_eq!(url.as_str(), "http://h/longer/p?q#f");
        assert_eq!(url.part(Part::Query), "?q");
        assert_eq!(url.part_len(Part::Fragment), before);
    }

    #[test]
    fn capacity_is_kept() {
        let mut url = Url::parse("http://example.com/some/long/path?with=query").unwrap();
        let cap = url.capacity();
        url.remove_query();
        url.segments_mut().clear();
        assert_eq!(url.as_str(), "http://example.com");
        assert!(url.capacity() >= cap);
    }

    #[test]
    #[should_panic = "parts table out of sync"]
    fn consistency_fault_panics() {
        let mut url = Url::parse("a:b").unwrap();
        url.parts[Part::Path] -= 1;
        url.remove_query();
    }
}
