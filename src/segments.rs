//! A sequence view of the path component.

use crate::{
    error::OutOfRange,
    parse::{LazyIter, LazyRange, Located, PctSpan, Segment, Span},
    pct_enc::{
        self,
        encoder::{self, Path},
        table::SEGMENT,
        EStr, EString,
    },
    url::{Part, Url},
    view::Cursor,
};
use alloc::string::String;
use core::{iter::FusedIterator, ops::Deref};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// A read-only view of the path of a [`Url`] as a sequence of decoded segments.
///
/// An absolute path has one segment per `"/"`, so `"/"` holds a single empty
/// segment and `"/a/"` holds `"a"` and `""`. A rootless path such as `"a/b"`
/// has its first segment start right at the beginning of the path. An empty
/// path has no segments.
///
/// Without an authority, a path such as `"/.//a"` has its `"/."` skipped, so it
/// holds `""` and `"a"`. Edits write this prefix whenever the path would
/// otherwise start with `"//"`.
///
/// This view is obtained with [`Url::segments`].
///
/// # Examples
///
/// ```
/// use uri_splice::Url;
///
/// let url = Url::parse("http://example.com/a%20b/c/")?;
/// let segs: Vec<_> = url.segments().iter().collect();
/// assert_eq!(segs, ["a b", "c", ""]);
/// assert!(url.segments().is_absolute());
/// # Ok::<_, uri_splice::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Segments {
    url: Url,
}

impl Segments {
    #[ref_cast_custom]
    pub(crate) fn new(url: &Url) -> &Self;

    // Length of a "/." that keeps a path starting with an empty segment
    // from reading as an authority. It is not a segment.
    fn prefix_len(&self) -> usize {
        let dot_prefixed = self.url.path().as_str().starts_with("/.//");
        if dot_prefixed && !self.url.has_authority() {
            2
        } else {
            0
        }
    }

    fn range(&self) -> LazyRange<'_, Segment> {
        let r = self.url.range(Part::Path);
        LazyRange::new(
            self.url.as_str().as_bytes(),
            Span::new(r.start + self.prefix_len(), r.end),
            self.is_absolute(),
        )
    }

    fn located(&self, c: Cursor) -> Option<Located<PctSpan>> {
        self.range().iter_at(c.offset()).next()
    }

    fn raw(&self, span: PctSpan) -> &EStr<Path> {
        EStr::new_validated(&self.url.as_str()[span.span.range()])
    }

    fn decode(&self, span: PctSpan) -> String {
        self.raw(span).decode().to_string_lossy().into_owned()
    }

    fn segment_eq(&self, span: PctSpan, segment: &str) -> bool {
        self.raw(span).decode().eq_decoded(segment.as_bytes())
    }

    /// Returns the [`Url`] this view belongs to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Checks whether the path starts with `"/"`.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.url.path().as_str().starts_with('/')
    }

    /// Returns a cursor to the first segment.
    ///
    /// Equals [`end`](Self::end) if the path is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.url.range(Part::Path).start + self.prefix_len())
    }

    /// Returns the cursor past the last segment.
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::new(self.url.range(Part::Path).end)
    }

    /// Returns a cursor to the segment after the one at `c`.
    ///
    /// Returns `c` unchanged if it is the end cursor.
    #[must_use]
    pub fn next(&self, c: Cursor) -> Cursor {
        self.located(c).map_or(c, |e| Cursor::new(e.span.end))
    }

    /// Returns the segment at `c`, or `None` if it is the end cursor.
    #[must_use]
    pub fn get(&self, c: Cursor) -> Option<String> {
        self.located(c).map(|e| self.decode(e.value))
    }

    /// Returns a cursor to the segment at `index`, or the end cursor if out of range.
    #[must_use]
    pub fn nth_cursor(&self, index: usize) -> Cursor {
        self.range()
            .iter()
            .nth(index)
            .map_or(self.end(), |e| Cursor::new(e.span.start))
    }

    /// Counts the segments by scanning the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range().count()
    }

    /// Checks whether the path has no segments, that is, whether it is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// Returns the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `index` is out of range.
    pub fn at(&self, index: usize) -> Result<String, OutOfRange> {
        match self.range().iter().nth(index) {
            Some(e) => Ok(self.decode(e.value)),
            None => Err(OutOfRange {
                index,
                len: self.len(),
            }),
        }
    }

    /// Returns the segment at `index`.
    ///
    /// An out-of-range `index` panics in debug builds and yields an
    /// empty string otherwise. Use [`at`](Self::at) for a checked access.
    #[must_use]
    pub fn nth(&self, index: usize) -> String {
        debug_assert!(index < self.len(), "index out of range");
        self.at(index).unwrap_or_default()
    }

    /// Returns the first segment.
    #[must_use]
    pub fn front(&self) -> Option<String> {
        self.get(self.begin())
    }

    /// Returns the last segment.
    #[must_use]
    pub fn back(&self) -> Option<String> {
        self.range().iter().last().map(|e| self.decode(e.value))
    }

    /// Finds the first segment that equals `segment` once decoded.
    ///
    /// Returns the end cursor if there is none.
    #[must_use]
    pub fn find(&self, segment: &str) -> Cursor {
        self.find_from(self.begin(), segment)
    }

    /// Finds the first segment at or after `from` that equals `segment` once decoded.
    ///
    /// Returns the end cursor if there is none.
    #[must_use]
    pub fn find_from(&self, from: Cursor, segment: &str) -> Cursor {
        self.range()
            .iter_at(from.offset())
            .find(|e| self.segment_eq(e.value, segment))
            .map_or(self.end(), |e| Cursor::new(e.span.start))
    }

    /// Counts the segments that equal `segment` once decoded.
    #[must_use]
    pub fn count(&self, segment: &str) -> usize {
        self.range()
            .iter()
            .filter(|e| self.segment_eq(e.value, segment))
            .count()
    }

    /// Checks whether any segment equals `segment` once decoded.
    #[must_use]
    pub fn contains(&self, segment: &str) -> bool {
        self.find(segment) != self.end()
    }

    /// Returns an iterator over the decoded segments.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            segments: self,
            inner: self.range().iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = String;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// An iterator over the decoded segments of a path.
///
/// This struct is created by [`Segments::iter`].
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a> {
    segments: &'a Segments,
    inner: LazyIter<'a, Segment>,
}

impl Iterator for Iter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next().map(|e| self.segments.decode(e.value))
    }
}

impl FusedIterator for Iter<'_> {}

/// A mutable view of the path of a [`Url`] as a sequence of segments.
///
/// Segments are percent-encoded when written, so that `"/"`, `"?"` and `"#"`
/// in them never change the structure of the URI. The first segment of a
/// relative reference without authority also has its `":"` encoded, so that
/// it is never mistaken for a scheme.
///
/// Inserting into an empty path makes it absolute when an authority is
/// present or the first segment is empty, and rootless otherwise.
///
/// This view is obtained with [`Url::segments_mut`].
///
/// # Examples
///
/// ```
/// use uri_splice::Url;
///
/// let mut url = Url::parse("http://example.com")?;
/// url.segments_mut().push_back("a/b");
/// url.segments_mut().push_back("c");
/// assert_eq!(url.as_str(), "http://example.com/a%2Fb/c");
///
/// let mut url = Url::parse("")?;
/// url.segments_mut().push_back("x:y");
/// assert_eq!(url.as_str(), "x%3Ay");
/// # Ok::<_, uri_splice::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct SegmentsMut {
    url: Url,
}

impl Deref for SegmentsMut {
    type Target = Segments;

    fn deref(&self) -> &Segments {
        Segments::new(&self.url)
    }
}

impl SegmentsMut {
    #[ref_cast_custom]
    pub(crate) fn new(url: &mut Url) -> &mut Self;

    fn splice(&mut self, start: usize, end: usize, s: &str) {
        self.url.splice(Part::Path, start..end, s);
    }

    fn element_span(&self, c: Cursor) -> Located<PctSpan> {
        match self.located(c) {
            Some(e) => e,
            None => panic!("cursor does not point to a segment"),
        }
    }

    // A leading rootless segment of a relative reference may not contain ":".
    fn first_is_no_colon(&self) -> bool {
        !self.url.has_scheme() && !self.url.has_authority()
    }

    fn encode(segment: &str) -> EString<Path> {
        let mut buf = EString::<Path>::new();
        buf.encode_str::<encoder::Segment>(segment);
        buf
    }

    fn encode_first(&self, segment: &str) -> EString<Path> {
        if self.first_is_no_colon() {
            let mut buf = EString::<Path>::new();
            buf.encode_str::<encoder::SegmentNzNc>(segment);
            buf
        } else {
            Self::encode(segment)
        }
    }

    /// Inserts a segment before the one at `before`, and returns a cursor to it.
    pub fn insert(&mut self, before: Cursor, segment: &str) -> Cursor {
        let had_prefix = self.prefix_len() != 0;
        let path = self.url.range(Part::Path);
        let at = before.offset();
        debug_assert!(path.start <= at && at <= path.end);

        if path.is_empty() {
            if self.url.has_authority() || segment.is_empty() {
                let enc = Self::encode(segment);
                self.splice(at, at, &["/", enc.as_str()].concat());
            } else {
                let enc = self.encode_first(segment);
                self.splice(at, at, enc.as_str());
            }
        } else if at == path.start && !self.is_absolute() {
            if segment.is_empty() {
                // An empty first segment needs the absolute form.
                self.splice(at, at, "//");
            } else {
                let enc = self.encode_first(segment);
                self.splice(at, at, &[enc.as_str(), "/"].concat());
            }
        } else {
            let enc = Self::encode(segment);
            self.splice(at, at, &["/", enc.as_str()].concat());
        }
        self.fix_prefix(had_prefix, before)
    }

    /// Inserts segments before the one at `before`, in order, and returns
    /// a cursor to the first inserted one.
    ///
    /// The sequence is traversed twice, once to reserve space and once to
    /// insert each segment. Returns `before` if the sequence is empty.
    pub fn insert_all<I>(&mut self, before: Cursor, segments: I) -> Cursor
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Clone,
    {
        let iter = segments.into_iter();
        let additional: usize = iter
            .clone()
            .map(|s| pct_enc::encoded_len(s.as_ref().as_bytes(), SEGMENT) + 1)
            .sum();
        self.url.reserve(additional);

        let mut at = before;
        for s in iter {
            at = self.insert(at, s.as_ref());
            at = self.next(at);
        }
        before
    }

    /// Replaces all segments with the given ones.
    pub fn assign<I>(&mut self, segments: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Clone,
    {
        self.clear();
        let end = self.end();
        self.insert_all(end, segments);
    }

    /// Replaces the segment at `c`, and returns a cursor to the new segment.
    ///
    /// # Panics
    ///
    /// Panics if `c` is the end cursor.
    pub fn replace(&mut self, c: Cursor, segment: &str) -> Cursor {
        let had_prefix = self.prefix_len() != 0;
        let e = self.element_span(c);
        if c == self.begin() && !self.is_absolute() {
            if segment.is_empty() {
                // An empty first segment needs the absolute form.
                self.splice(e.span.start, e.span.end, "/");
            } else {
                let enc = self.encode_first(segment);
                self.splice(e.span.start, e.span.end, enc.as_str());
            }
        } else {
            let enc = Self::encode(segment);
            self.splice(e.span.start + 1, e.span.end, enc.as_str());
        }
        self.fix_prefix(had_prefix, c)
    }

    /// Replaces the segments in `[first, last)` with the given ones, and
    /// returns a cursor to the first new segment.
    pub fn replace_range<I>(&mut self, first: Cursor, last: Cursor, segments: I) -> Cursor
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Clone,
    {
        let at = self.erase_range(first, last);
        self.insert_all(at, segments)
    }

    /// Removes the segment at `c`, and returns a cursor to the segment
    /// that took its place, or the end cursor.
    ///
    /// # Panics
    ///
    /// Panics if `c` is the end cursor.
    pub fn erase(&mut self, c: Cursor) -> Cursor {
        let e = self.element_span(c);
        self.erase_span(c, Cursor::new(e.span.end))
    }

    /// Removes the segments in `[first, last)`, and returns a cursor to the
    /// segment that took their place, or the end cursor.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        debug_assert!(first <= last);
        if first == last {
            return first;
        }
        self.erase_span(first, last)
    }

    // `[first, last)` must cover whole segments and be non-empty.
    fn erase_span(&mut self, first: Cursor, last: Cursor) -> Cursor {
        let had_prefix = self.prefix_len() != 0;
        let path = self.url.range(Part::Path);
        let (start, end) = (first.offset(), last.offset());

        if self.is_absolute() || start != path.start || end == path.end {
            self.splice(start, end, "");
            return self.fix_prefix(had_prefix, first);
        }

        // Removing leading segments of a rootless path that keeps some.
        let next = self.element_span(last);
        if next.value.span.is_empty() {
            // The path becomes absolute, starting with the empty segment.
            self.splice(start, end, "");
        } else {
            // The next segment is promoted to first and loses its "/".
            let raw = self.raw(next.value).as_str();
            let promoted = if self.first_is_no_colon() {
                raw.replace(':', "%3A")
            } else {
                String::from(raw)
            };
            self.splice(start, next.span.end, &promoted);
        }
        self.fix_prefix(had_prefix, first)
    }

    // Writes or drops the "/." prefix after an edit so that the path never
    // starts with "//" without an authority, and shifts `c` to match.
    fn fix_prefix(&mut self, had_prefix: bool, c: Cursor) -> Cursor {
        if self.url.has_authority() {
            return c;
        }
        let start = self.url.range(Part::Path).start;
        let text = self.url.path().as_str();

        if had_prefix {
            if !text.starts_with("/.") || text[2..].starts_with("//") {
                return c;
            }
            self.splice(start, start + 2, "");
            return self.fix_prefix(false, Cursor::new(c.offset() - 2));
        }

        if text.starts_with("/.//") {
            // A real "." segment that would read as the prefix.
            self.splice(start + 1, start + 2, "%2E");
            if c.offset() > start + 1 {
                return Cursor::new(c.offset() + 2);
            }
        } else if text.starts_with("//") {
            self.splice(start, start, "/.");
            return Cursor::new(c.offset() + 2);
        }
        c
    }

    /// Removes every segment that equals `segment` once decoded, keeping the
    /// order of the others, and returns how many were removed.
    pub fn erase_all(&mut self, segment: &str) -> usize {
        let mut n = 0;
        let mut c = self.begin();
        while let Some(e) = self.located(c) {
            if self.segment_eq(e.value, segment) {
                // The next segment moves to `c`.
                c = self.erase(c);
                n += 1;
            } else {
                c = Cursor::new(e.span.end);
            }
        }
        n
    }

    /// Appends a segment.
    pub fn push_back(&mut self, segment: &str) {
        let end = self.end();
        self.insert(end, segment);
    }

    /// Removes the last segment and returns it, or `None` if there is none.
    pub fn pop_back(&mut self) -> Option<String> {
        let last = self.range().iter().last()?;
        let segment = self.decode(last.value);
        self.erase(Cursor::new(last.span.start));
        Some(segment)
    }

    /// Removes all segments, making the path empty.
    pub fn clear(&mut self) {
        let path = self.url.range(Part::Path);
        self.splice(path.start, path.end, "");
    }
}
