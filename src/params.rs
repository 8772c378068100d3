//! A sequence view of the query component.

use crate::{
    error::OutOfRange,
    parse::{LazyIter, LazyRange, Located, ParamSpans, PctSpan, QueryParam, Span},
    pct_enc::{
        self,
        encoder::{self, Query},
        table::QUERY_DATA,
        EStr, EString,
    },
    url::{Part, Url},
    view::Cursor,
};
use alloc::string::String;
use core::{iter::FusedIterator, ops::Deref};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// A decoded query element.
///
/// An element without `"="`, such as `b` in `"a=1&b"`, has no value,
/// while an element such as `"b="` has an empty value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Param {
    /// The decoded key.
    pub key: String,
    /// The decoded value, if any.
    pub value: Option<String>,
}

impl Param {
    /// Creates a new element.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            value: value.map(Into::into),
        }
    }

    /// Checks whether the element has a value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// An unencoded query element to be written into a query.
///
/// Keys and values are percent-encoded independently when written,
/// so that `"&"`, `"="` and `"+"` in them never change the structure of the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamRef<'a> {
    /// The unencoded key.
    pub key: &'a str,
    /// The unencoded value, if any.
    pub value: Option<&'a str>,
}

impl<'a> From<&'a str> for ParamRef<'a> {
    fn from(key: &'a str) -> Self {
        Self { key, value: None }
    }
}

impl<'a> From<(&'a str, &'a str)> for ParamRef<'a> {
    fn from((key, value): (&'a str, &'a str)) -> Self {
        Self {
            key,
            value: Some(value),
        }
    }
}

impl<'a> From<(&'a str, Option<&'a str>)> for ParamRef<'a> {
    fn from((key, value): (&'a str, Option<&'a str>)) -> Self {
        Self { key, value }
    }
}

impl<'a> From<&'a Param> for ParamRef<'a> {
    fn from(p: &'a Param) -> Self {
        Self {
            key: &p.key,
            value: p.value.as_deref(),
        }
    }
}

fn encode(p: ParamRef<'_>) -> EString<Query> {
    let value_len = p.value.map_or(0, |v| v.len() + 1);
    let mut buf = EString::<Query>::with_capacity(p.key.len() + value_len);
    buf.encode_str::<encoder::Param>(p.key);
    if let Some(value) = p.value {
        buf.push(b'=');
        buf.encode_str::<encoder::Param>(value);
    }
    buf
}

/// A read-only view of the query of a [`Url`] as a sequence of [`Param`]s.
///
/// Elements are separated by `"&"` and split on the first `"="`. Elements are
/// not indexed: positions are [`Cursor`]s, and counting or jumping to the
/// `n`-th element scans the query from the start. An absent query has no
/// elements, and `"?"` alone has a single empty one.
///
/// This view is obtained with [`Url::params`].
///
/// # Examples
///
/// ```
/// use uri_splice::{Param, Url};
///
/// let url = Url::parse("?a=1&b&c=2&a=3")?;
/// let params = url.params();
/// assert_eq!(params.len(), 4);
/// assert_eq!(params.count("a"), 2);
///
/// let b = params.get(params.find("b")).unwrap();
/// assert_eq!(b, Param::new("b", None::<&str>));
/// # Ok::<_, uri_splice::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Params {
    url: Url,
}

impl Params {
    #[ref_cast_custom]
    pub(crate) fn new(url: &Url) -> &Self;

    fn range(&self) -> LazyRange<'_, QueryParam> {
        let r = self.url.range(Part::Query);
        LazyRange::new(self.url.as_str().as_bytes(), Span::new(r.start, r.end), true)
    }

    fn located(&self, c: Cursor) -> Option<Located<ParamSpans>> {
        self.range().iter_at(c.offset()).next()
    }

    fn raw(&self, span: PctSpan) -> &EStr<Query> {
        EStr::new_validated(&self.url.as_str()[span.span.range()])
    }

    fn decode(&self, spans: ParamSpans) -> Param {
        Param {
            key: self.raw(spans.key).decode().to_string_lossy().into_owned(),
            value: spans
                .value
                .map(|v| self.raw(v).decode().to_string_lossy().into_owned()),
        }
    }

    fn key_eq(&self, spans: ParamSpans, key: &str) -> bool {
        self.raw(spans.key).decode().eq_decoded(key.as_bytes())
    }

    /// Returns the [`Url`] this view belongs to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns a cursor to the first element.
    ///
    /// Equals [`end`](Self::end) if the query is absent.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.url.range(Part::Query).start)
    }

    /// Returns the cursor past the last element.
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::new(self.url.range(Part::Query).end)
    }

    /// Returns a cursor to the element after the one at `c`.
    ///
    /// Returns `c` unchanged if it is the end cursor.
    #[must_use]
    pub fn next(&self, c: Cursor) -> Cursor {
        self.located(c).map_or(c, |e| Cursor::new(e.span.end))
    }

    /// Returns the element at `c`, or `None` if it is the end cursor.
    #[must_use]
    pub fn get(&self, c: Cursor) -> Option<Param> {
        self.located(c).map(|e| self.decode(e.value))
    }

    /// Returns a cursor to the element at `index`, or the end cursor if out of range.
    #[must_use]
    pub fn nth_cursor(&self, index: usize) -> Cursor {
        self.range()
            .iter()
            .nth(index)
            .map_or(self.end(), |e| Cursor::new(e.span.start))
    }

    /// Counts the elements by scanning the query.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range().count()
    }

    /// Checks whether the query has no elements, that is, whether it is absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `index` is out of range.
    pub fn at(&self, index: usize) -> Result<Param, OutOfRange> {
        let mut iter = self.range().iter();
        match iter.nth(index) {
            Some(e) => Ok(self.decode(e.value)),
            None => Err(OutOfRange {
                index,
                len: self.len(),
            }),
        }
    }

    /// Returns the element at `index`.
    ///
    /// An out-of-range `index` panics in debug builds and yields an
    /// empty element otherwise. Use [`at`](Self::at) for a checked access.
    #[must_use]
    pub fn nth(&self, index: usize) -> Param {
        debug_assert!(index < self.len(), "index out of range");
        self.at(index).unwrap_or_default()
    }

    /// Returns the first element.
    #[must_use]
    pub fn front(&self) -> Option<Param> {
        self.get(self.begin())
    }

    /// Returns the last element.
    #[must_use]
    pub fn back(&self) -> Option<Param> {
        self.range().iter().last().map(|e| self.decode(e.value))
    }

    /// Finds the first element whose decoded key equals `key`.
    ///
    /// Returns the end cursor if there is none.
    #[must_use]
    pub fn find(&self, key: &str) -> Cursor {
        self.find_from(self.begin(), key)
    }

    /// Finds the first element at or after `from` whose decoded key equals `key`.
    ///
    /// Returns the end cursor if there is none.
    #[must_use]
    pub fn find_from(&self, from: Cursor, key: &str) -> Cursor {
        self.range()
            .iter_at(from.offset())
            .find(|e| self.key_eq(e.value, key))
            .map_or(self.end(), |e| Cursor::new(e.span.start))
    }

    /// Counts the elements whose decoded key equals `key`.
    #[must_use]
    pub fn count(&self, key: &str) -> usize {
        self.range()
            .iter()
            .filter(|e| self.key_eq(e.value, key))
            .count()
    }

    /// Checks whether any element has a decoded key equal to `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.find(key) != self.end()
    }

    /// Returns an iterator over the decoded elements.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            params: self,
            inner: self.range().iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = Param;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// An iterator over the decoded elements of a query.
///
/// This struct is created by [`Params::iter`].
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a> {
    params: &'a Params,
    inner: LazyIter<'a, QueryParam>,
}

impl Iterator for Iter<'_> {
    type Item = Param;

    fn next(&mut self) -> Option<Param> {
        self.inner.next().map(|e| self.params.decode(e.value))
    }
}

impl FusedIterator for Iter<'_> {}

/// A mutable view of the query of a [`Url`] as a sequence of [`Param`]s.
///
/// Every edit is a splice of the buffer of the [`Url`]. The read-only
/// methods of [`Params`] are available through [`Deref`].
///
/// This view is obtained with [`Url::params_mut`].
///
/// # Examples
///
/// ```
/// use uri_splice::Url;
///
/// let mut url = Url::parse("http://example.com/")?;
/// let params = url.params_mut();
/// params.push_back(("q", "a&b"));
/// params.push_back("flag");
/// let c = params.find("q");
/// params.replace_value(c, "c=d");
/// assert_eq!(url.as_str(), "http://example.com/?q=c%3Dd&flag");
/// # Ok::<_, uri_splice::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct ParamsMut {
    url: Url,
}

impl Deref for ParamsMut {
    type Target = Params;

    fn deref(&self) -> &Params {
        Params::new(&self.url)
    }
}

impl ParamsMut {
    #[ref_cast_custom]
    pub(crate) fn new(url: &mut Url) -> &mut Self;

    fn splice(&mut self, start: usize, end: usize, s: &str) {
        self.url.splice(Part::Query, start..end, s);
    }

    fn element_span(&self, c: Cursor) -> Located<ParamSpans> {
        match self.located(c) {
            Some(e) => e,
            None => panic!("cursor does not point to an element"),
        }
    }

    /// Inserts an element before the one at `before`, and returns a cursor to it.
    ///
    /// Inserting into an absent query makes it present.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_splice::Url;
    ///
    /// let mut url = Url::parse("/path")?;
    /// let params = url.params_mut();
    /// let end = params.end();
    /// params.insert(end, ("x", "y"));
    /// assert_eq!(url.query().unwrap(), "x=y");
    /// # Ok::<_, uri_splice::ParseError>(())
    /// ```
    pub fn insert<'p>(&mut self, before: Cursor, param: impl Into<ParamRef<'p>>) -> Cursor {
        let kv = encode(param.into());
        let query = self.url.range(Part::Query);
        let at = before.offset();
        debug_assert!(query.start <= at && at <= query.end);

        if query.is_empty() {
            self.splice(at, at, &["?", kv.as_str()].concat());
        } else if at == query.start {
            // The new element takes over the "?" of the old first element.
            self.splice(at, at + 1, &["?", kv.as_str(), "&"].concat());
        } else {
            self.splice(at, at, &["&", kv.as_str()].concat());
        }
        before
    }

    /// Inserts elements before the one at `before`, in order, and returns
    /// a cursor to the first inserted one.
    ///
    /// The sequence is traversed twice, once to reserve space and once to
    /// insert each element. Returns `before` if the sequence is empty.
    pub fn insert_all<'p, I>(&mut self, before: Cursor, params: I) -> Cursor
    where
        I: IntoIterator,
        I::Item: Into<ParamRef<'p>>,
        I::IntoIter: Clone,
    {
        let iter = params.into_iter();
        let additional: usize = iter
            .clone()
            .map(|p| {
                let p = p.into();
                let value_len = p
                    .value
                    .map_or(0, |v| pct_enc::encoded_len(v.as_bytes(), QUERY_DATA) + 1);
                pct_enc::encoded_len(p.key.as_bytes(), QUERY_DATA) + value_len + 1
            })
            .sum();
        self.url.reserve(additional);

        let mut at = before;
        for p in iter {
            at = self.insert(at, p);
            at = self.next(at);
        }
        before
    }

    /// Replaces all elements with the given ones.
    pub fn assign<'p, I>(&mut self, params: I)
    where
        I: IntoIterator,
        I::Item: Into<ParamRef<'p>>,
        I::IntoIter: Clone,
    {
        self.clear();
        let end = self.end();
        self.insert_all(end, params);
    }

    /// Replaces the element at `c`, and returns a cursor to the new element.
    ///
    /// # Panics
    ///
    /// Panics if `c` is the end cursor.
    pub fn replace<'p>(&mut self, c: Cursor, param: impl Into<ParamRef<'p>>) -> Cursor {
        let e = self.element_span(c);
        let kv = encode(param.into());
        self.splice(e.span.start + 1, e.span.end, kv.as_str());
        c
    }

    /// Replaces the elements in `[first, last)` with the given ones, and
    /// returns a cursor to the first new element.
    pub fn replace_range<'p, I>(&mut self, first: Cursor, last: Cursor, params: I) -> Cursor
    where
        I: IntoIterator,
        I::Item: Into<ParamRef<'p>>,
        I::IntoIter: Clone,
    {
        let at = self.erase_range(first, last);
        self.insert_all(at, params)
    }

    /// Removes the value of the element at `c`, along with its `"="`.
    ///
    /// Does nothing if the element has no value.
    ///
    /// # Panics
    ///
    /// Panics if `c` is the end cursor.
    pub fn remove_value(&mut self, c: Cursor) -> Cursor {
        let e = self.element_span(c);
        if let Some(value) = e.value.value {
            self.splice(value.span.start - 1, e.span.end, "");
        }
        c
    }

    /// Sets the value of the element at `c`, keeping its key.
    ///
    /// # Panics
    ///
    /// Panics if `c` is the end cursor.
    pub fn replace_value(&mut self, c: Cursor, value: &str) -> Cursor {
        let e = self.element_span(c);
        let mut buf = EString::<Query>::new();
        buf.encode_str::<encoder::Param>(value);
        match e.value.value {
            Some(old) => self.splice(old.span.start, e.span.end, buf.as_str()),
            None => self.splice(e.span.end, e.span.end, &["=", buf.as_str()].concat()),
        }
        c
    }

    /// Removes the element at `c`, and returns a cursor to the element
    /// that took its place, or the end cursor.
    ///
    /// Removing the only element makes the query absent.
    ///
    /// # Panics
    ///
    /// Panics if `c` is the end cursor.
    pub fn erase(&mut self, c: Cursor) -> Cursor {
        let e = self.element_span(c);
        self.erase_span(e.span.start, e.span.end);
        c
    }

    /// Removes the elements in `[first, last)`, and returns a cursor to the
    /// element that took their place, or the end cursor.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        debug_assert!(first <= last);
        if first != last {
            self.erase_span(first.offset(), last.offset());
        }
        first
    }

    // `[start, end)` must cover whole elements.
    fn erase_span(&mut self, start: usize, end: usize) {
        let query = self.url.range(Part::Query);
        if start != query.start {
            self.splice(start, end, "");
        } else if end == query.end {
            self.splice(start, end, "");
        } else {
            // Drop the "&" of the new first element and keep the "?".
            self.splice(start, end + 1, "?");
        }
    }

    /// Removes every element whose decoded key equals `key`, keeping the
    /// order of the others, and returns how many were removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_splice::Url;
    ///
    /// let mut url = Url::parse("?a=1&b=2&a=3&c")?;
    /// assert_eq!(url.params_mut().erase_all("a"), 2);
    /// assert_eq!(url.as_str(), "?b=2&c");
    /// # Ok::<_, uri_splice::ParseError>(())
    /// ```
    pub fn erase_all(&mut self, key: &str) -> usize {
        let mut n = 0;
        let mut c = self.begin();
        while let Some(e) = self.located(c) {
            if self.key_eq(e.value, key) {
                // The next element moves to `c`.
                c = self.erase(c);
                n += 1;
            } else {
                c = Cursor::new(e.span.end);
            }
        }
        n
    }

    /// Replaces the element at `c` with one built from unencoded text.
    pub fn emplace_at(&mut self, c: Cursor, key: &str, value: Option<&str>) -> Cursor {
        self.replace(c, (key, value))
    }

    /// Inserts an element built from unencoded text before the one at `c`.
    pub fn emplace_before(&mut self, c: Cursor, key: &str, value: Option<&str>) -> Cursor {
        self.insert(c, (key, value))
    }

    /// Appends an element built from unencoded text.
    pub fn emplace_back(&mut self, key: &str, value: Option<&str>) -> Cursor {
        let end = self.end();
        self.insert(end, (key, value))
    }

    /// Appends an element.
    pub fn push_back<'p>(&mut self, param: impl Into<ParamRef<'p>>) {
        let end = self.end();
        self.insert(end, param);
    }

    /// Removes the last element and returns it, or `None` if there is none.
    pub fn pop_back(&mut self) -> Option<Param> {
        let last = self.range().iter().last()?;
        let param = self.decode(last.value);
        self.erase(Cursor::new(last.span.start));
        Some(param)
    }

    /// Removes all elements, making the query absent.
    pub fn clear(&mut self) {
        self.url.remove_query();
    }
}
