//! Rule combinators.

use super::{err, Element, Reader, Result, Rule, Span};
use core::{fmt, iter::FusedIterator, marker::PhantomData};

/// Zero or one occurrence of a rule.
///
/// On failure, the reader is restored to where it was before the attempt
/// and the output is `None`.
#[derive(Debug)]
pub struct Optional<R>(PhantomData<R>);

impl<R: Rule> Rule for Optional<R> {
    type Output = Option<R::Output>;
    const NAME: &'static str = R::NAME;

    fn parse(r: &mut Reader<'_>) -> Result<Self::Output> {
        let pos = r.pos();
        match R::parse(r) {
            Ok(out) => Ok(Some(out)),
            Err(_) => {
                r.reset(pos);
                Ok(None)
            }
        }
    }
}

/// An element of a [`LazyRange`] together with its location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Located<T> {
    /// The span of the whole element, including its leading delimiter if any.
    pub span: Span,
    /// The output of the element rule.
    pub value: T,
}

/// A sequence of delimited elements, parsed on demand.
///
/// A range in the *leading* form (such as `"/a/b"` or `"?k=v&x"`) has every
/// element introduced by a one-byte delimiter, where the first one may differ
/// from [`Element::DELIM`]. A range in the *bare* form (such as `"a/b"`) has
/// its first element start right at the beginning of the span.
///
/// An empty span contains no elements in either form. Otherwise every delimiter
/// introduces one more element, so `"/"` and `"?"` hold a single empty element
/// and `"a/"` holds two.
///
/// Nothing is stored beyond the span: counting rescans the range, and
/// iteration re-parses from where the previous element ended.
pub struct LazyRange<'a, R> {
    input: &'a [u8],
    span: Span,
    leading: bool,
    rule: PhantomData<R>,
}

impl<'a, R: Element> LazyRange<'a, R> {
    pub(crate) fn new(input: &'a [u8], span: Span, leading: bool) -> Self {
        debug_assert!(span.end <= input.len());
        Self {
            input,
            span,
            leading,
            rule: PhantomData,
        }
    }

    /// Validates `span` of `input` as a sequence of elements.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an element does not match the rule
    /// or is not followed by a delimiter or the end of the span.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of the bounds of `input`.
    pub fn parse(input: &'a [u8], span: Span, leading: bool) -> Result<Self> {
        let bytes = &input[..span.end];
        let mut r = Reader::at(bytes, span.start);
        if !span.is_empty() {
            if leading {
                r.skip(1);
            }
            loop {
                R::parse(&mut r)?;
                match r.peek(0) {
                    None => break,
                    Some(x) if x == R::DELIM => r.skip(1),
                    Some(_) => err!(r.pos(), UnexpectedChar, R::NAME),
                }
            }
        }
        Ok(Self::new(input, span, leading))
    }

    /// Returns the input the range points into.
    #[must_use]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Returns the span of the whole range.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Checks whether every element is introduced by a delimiter.
    #[must_use]
    pub fn is_leading(&self) -> bool {
        self.leading
    }

    /// Checks whether the range has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Counts the elements by scanning the range.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> LazyIter<'a, R> {
        self.iter_at(self.span.start)
    }

    // `pos` must be the start of an element or the end of the range.
    pub(crate) fn iter_at(&self, pos: usize) -> LazyIter<'a, R> {
        debug_assert!(self.span.start <= pos && pos <= self.span.end);
        LazyIter {
            input: &self.input[..self.span.end],
            pos,
            bare: pos == self.span.start && !self.leading && !self.span.is_empty(),
            rule: PhantomData,
        }
    }
}

impl<'a, R: Element> IntoIterator for &LazyRange<'a, R> {
    type Item = Located<R::Output>;
    type IntoIter = LazyIter<'a, R>;

    fn into_iter(self) -> LazyIter<'a, R> {
        self.iter()
    }
}

impl<R> Clone for LazyRange<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for LazyRange<'_, R> {}

impl<R> fmt::Debug for LazyRange<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRange")
            .field("span", &self.span)
            .field("leading", &self.leading)
            .finish()
    }
}

/// An iterator over the elements of a [`LazyRange`].
pub struct LazyIter<'a, R> {
    // Truncated to the end of the range.
    input: &'a [u8],
    pos: usize,
    // Whether the next element has no delimiter.
    bare: bool,
    rule: PhantomData<R>,
}

impl<R: Element> Iterator for LazyIter<'_, R> {
    type Item = Located<R::Output>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let mut r = Reader::at(self.input, start);
        if self.bare {
            self.bare = false;
        } else if r.has_remaining() {
            r.skip(1);
        } else {
            return None;
        }

        let Ok(value) = R::parse(&mut r) else {
            // Only reachable for a range that was never validated.
            self.pos = self.input.len();
            return None;
        };
        debug_assert!(r.peek(0).map_or(true, |x| x == R::DELIM));

        self.pos = r.pos();
        Some(Located {
            span: Span::new(start, self.pos),
            value,
        })
    }
}

impl<R: Element> FusedIterator for LazyIter<'_, R> {}

impl<R> fmt::Debug for LazyIter<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyIter").field("pos", &self.pos).finish()
    }
}
