//! Percent-encoding and decoding.
//!
//! A [`Table`] describes what a component may contain unencoded. An
//! [`Encoder`] attaches a table to a type so that [`EStr`] and [`EString`]
//! can carry it around at no runtime cost.

pub mod encoder;
mod estring;
pub mod table;

pub use estring::EString;
pub use table::Table;

use crate::error::DecodeError;
use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{hash, iter::FusedIterator, marker::PhantomData};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// Associates a [`Table`] with a marker type.
///
/// An encoder `A` can be used to write into an [`EString<B>`] only when
/// `A::TABLE` is a [subset](Table::is_subset) of `B::TABLE`.
pub trait Encoder: 'static {
    /// The allowed set.
    const TABLE: Table;
}

/// A string slice known to be valid under the table of `E`.
///
/// Every byte is either admitted unencoded by `E::TABLE` or is part of a
/// `%HH` octet, so the slice is always ASCII. Comparison is bytewise; two
/// slices that decode to the same data may still compare unequal.
///
/// # Examples
///
/// ```
/// use uri_splice::pct_enc::{encoder::Path, EStr};
///
/// let seg = EStr::<Path>::new_or_panic("%E5%BC%A0%E4%B8%89");
/// assert!(!seg.is_unencoded());
/// assert_eq!(seg.decode().to_string().unwrap(), "张三");
/// assert!(EStr::<Path>::new("a?b").is_none());
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct EStr<E: Encoder> {
    encoder: PhantomData<E>,
    inner: str,
}

impl<E: Encoder> EStr<E> {
    const CAN_DECODE: () = assert!(
        E::TABLE.allows_pct_encoded(),
        "encoder does not admit percent-encoded octets"
    );

    #[ref_cast_custom]
    pub(crate) const fn new_validated(s: &str) -> &Self;

    /// Checks `s` against `E::TABLE`.
    #[must_use]
    pub const fn new(s: &str) -> Option<&Self> {
        if E::TABLE.validate(s.as_bytes()) {
            Some(Self::new_validated(s))
        } else {
            None
        }
    }

    /// Like [`new`](Self::new), but panics on invalid input.
    ///
    /// # Panics
    ///
    /// Panics if `s` is not valid under `E::TABLE`.
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Self {
        match Self::new(s) {
            Some(s) => s,
            None => panic!("string is not properly percent-encoded"),
        }
    }

    /// Yields the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Length in bytes, counting each `%HH` as three.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether the slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if the slice holds no `%HH` octet.
    #[must_use]
    pub fn is_unencoded(&self) -> bool {
        !self.inner.contains('%')
    }

    /// Decodes the slice lazily.
    ///
    /// `+` is left alone; it does not stand for a space.
    pub fn decode(&self) -> Decode<'_> {
        () = Self::CAN_DECODE;
        Decode { rest: &self.inner }
    }
}

impl<E: Encoder> AsRef<str> for EStr<E> {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl<E: Encoder> PartialEq for EStr<E> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<E: Encoder> Eq for EStr<E> {}

impl<E: Encoder> PartialEq<str> for EStr<E> {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

impl<E: Encoder> PartialEq<&str> for EStr<E> {
    fn eq(&self, other: &&str) -> bool {
        &self.inner == *other
    }
}

impl<E: Encoder> PartialEq<EStr<E>> for str {
    fn eq(&self, other: &EStr<E>) -> bool {
        *self == other.inner
    }
}

impl<E: Encoder> hash::Hash for EStr<E> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

pub(crate) const fn decode_hexdigit(x: u8) -> Option<u8> {
    match x {
        b'0'..=b'9' => Some(x - b'0'),
        b'A'..=b'F' => Some(x - b'A' + 10),
        b'a'..=b'f' => Some(x - b'a' + 10),
        _ => None,
    }
}

pub(crate) const fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
}

/// Combines two hexadecimal digits into an octet. Non-digits count as zero.
pub(crate) fn decode_octet(hi: u8, lo: u8) -> u8 {
    debug_assert!(is_hexdig_pair(hi, lo));
    let digit = |x| decode_hexdigit(x).unwrap_or(0);
    (digit(hi) << 4) | digit(lo)
}

/// A piece of decoded output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// A run of bytes that were not encoded.
    Raw(&'a str),
    /// One `%HH` octet, decoded.
    Octet(u8),
}

/// Lazy decoder over an [`EStr`], created by [`EStr::decode`].
///
/// Iterating yields [`Chunk`]s. The consuming methods cover the usual
/// ways of getting at the decoded data.
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Decode<'a> {
    rest: &'a str,
}

impl<'a> Decode<'a> {
    fn collect_bytes(self) -> Vec<u8> {
        let octets = self.rest.bytes().filter(|&x| x == b'%').count();
        let mut buf = Vec::with_capacity(self.rest.len() - octets * 2);
        for chunk in self {
            match chunk {
                Chunk::Raw(s) => buf.extend_from_slice(s.as_bytes()),
                Chunk::Octet(x) => buf.push(x),
            }
        }
        buf
    }

    /// Decodes to bytes, borrowing when there is nothing to decode.
    #[must_use]
    pub fn to_bytes(self) -> Cow<'a, [u8]> {
        if self.rest.contains('%') {
            Cow::Owned(self.collect_bytes())
        } else {
            Cow::Borrowed(self.rest.as_bytes())
        }
    }

    /// Decodes to a string, borrowing when there is nothing to decode.
    ///
    /// # Errors
    ///
    /// Hands back the decoded bytes if they are not UTF-8.
    pub fn to_string(self) -> Result<Cow<'a, str>, Vec<u8>> {
        if !self.rest.contains('%') {
            return Ok(Cow::Borrowed(self.rest));
        }
        String::from_utf8(self.collect_bytes())
            .map(Cow::Owned)
            .map_err(|e| e.into_bytes())
    }

    /// Decodes to a string, substituting `U+FFFD` for bytes that are not UTF-8.
    #[must_use]
    pub fn to_string_lossy(self) -> Cow<'a, str> {
        match self.to_string() {
            Ok(s) => s,
            Err(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    /// Compares the decoded bytes with `other` without allocating.
    #[must_use]
    pub fn eq_decoded(self, other: &[u8]) -> bool {
        let mut other = other;
        for chunk in self {
            let rest = match chunk {
                Chunk::Raw(s) => other.strip_prefix(s.as_bytes()),
                Chunk::Octet(x) => other.strip_prefix(&[x][..]),
            };
            match rest {
                Some(rest) => other = rest,
                None => return false,
            }
        }
        other.is_empty()
    }
}

impl<'a> Iterator for Decode<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let rest = self.rest;
        match *rest.as_bytes() {
            [] => None,
            [b'%', hi, lo, ..] => {
                self.rest = &rest[3..];
                Some(Chunk::Octet(decode_octet(hi, lo)))
            }
            _ => {
                let end = rest[1..].find('%').map_or(rest.len(), |i| i + 1);
                let raw;
                (raw, self.rest) = rest.split_at(end);
                Some(Chunk::Raw(raw))
            }
        }
    }
}

impl FusedIterator for Decode<'_> {}

/// Decodes bytes that have not been checked beforehand.
///
/// `%` must start a `%HH` octet. Any other byte is copied through.
///
/// # Errors
///
/// Returns the index of the `%` that starts the first bad octet.
///
/// # Examples
///
/// ```
/// use uri_splice::pct_enc;
///
/// assert_eq!(&*pct_enc::decode(b"%2D%E6%B5").unwrap(), b"\x2d\xe6\xb5");
/// assert_eq!(pct_enc::decode(b"%2d%fg").unwrap_err().index(), 3);
/// ```
pub fn decode(s: &[u8]) -> Result<Cow<'_, [u8]>, DecodeError> {
    if !s.contains(&b'%') {
        return Ok(Cow::Borrowed(s));
    }

    let mut buf = Vec::with_capacity(s.len());
    let mut i = 0;
    while let Some(&x) = s.get(i) {
        if x != b'%' {
            buf.push(x);
            i += 1;
            continue;
        }
        match s.get(i + 1..i + 3) {
            Some(&[hi, lo]) if is_hexdig_pair(hi, lo) => buf.push(decode_octet(hi, lo)),
            _ => return Err(DecodeError { index: i }),
        }
        i += 3;
    }
    Ok(Cow::Owned(buf))
}

/// Encodes bytes, keeping those that `table` [allows](Table::allows) and
/// writing every other byte as `%HH` with uppercase digits.
///
/// # Examples
///
/// ```
/// use uri_splice::pct_enc::{self, table::QUERY_DATA};
///
/// assert_eq!(pct_enc::encode(b"a b&c=d", QUERY_DATA), "a%20b%26c%3Dd");
/// ```
#[must_use]
pub fn encode(s: &[u8], table: Table) -> String {
    let mut buf = String::with_capacity(s.len());
    encode_into(&mut buf, s, table);
    buf
}

pub(crate) fn encode_into(buf: &mut String, s: &[u8], table: Table) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    buf.reserve(s.len());
    for &x in s {
        if table.allows(x) {
            buf.push(char::from(x));
        } else {
            buf.push('%');
            buf.push(char::from(HEX[usize::from(x >> 4)]));
            buf.push(char::from(HEX[usize::from(x & 0xf)]));
        }
    }
}

/// Length of `s` once encoded with `table`.
pub(crate) fn encoded_len(s: &[u8], table: Table) -> usize {
    s.iter()
        .map(|&x| if table.allows(x) { 1 } else { 3 })
        .sum()
}
