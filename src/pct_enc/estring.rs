use super::{encode_into, EStr, Encoder};
use alloc::string::String;
use core::{fmt, marker::PhantomData, ops::Deref};

/// An owned, growable [`EStr`].
///
/// Text goes in through [`encode_str`](Self::encode_str), which escapes it
/// with a narrower encoder, or through [`push`](Self::push) for delimiters
/// the table of `E` admits as they are.
///
/// # Examples
///
/// ```
/// use uri_splice::pct_enc::{
///     encoder::{Param, Query},
///     EString,
/// };
///
/// let mut query = EString::<Query>::new();
/// for (i, (k, v)) in [("name", "张三"), ("note", "a&b")].into_iter().enumerate() {
///     if i > 0 {
///         query.push(b'&');
///     }
///     query.encode_str::<Param>(k);
///     query.push(b'=');
///     query.encode_str::<Param>(v);
/// }
/// assert_eq!(query, "name=%E5%BC%A0%E4%B8%89&note=a%26b");
/// ```
#[derive(Clone)]
pub struct EString<E: Encoder> {
    buf: String,
    encoder: PhantomData<E>,
}

struct SubEncoder<Sub, Of> {
    _marker: PhantomData<(Sub, Of)>,
}

impl<Sub: Encoder, Of: Encoder> SubEncoder<Sub, Of> {
    const CHECK: () = assert!(
        Sub::TABLE.is_subset(Of::TABLE) && Sub::TABLE.allows_pct_encoded(),
        "encoder cannot write into this string"
    );
}

impl<E: Encoder> EString<E> {
    /// Creates an empty `EString`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty `EString` with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            encoder: PhantomData,
        }
    }

    /// Appends `s`, escaping every byte that `SubE::TABLE` does not allow.
    ///
    /// A space becomes `%20`, never `+`.
    ///
    /// Fails to compile unless `SubE::TABLE` is a subset of `E::TABLE`
    /// that admits percent-encoded octets.
    pub fn encode_str<SubE: Encoder>(&mut self, s: &str) {
        self.encode_bytes::<SubE>(s.as_bytes());
    }

    /// Byte-oriented form of [`encode_str`](Self::encode_str).
    pub fn encode_bytes<SubE: Encoder>(&mut self, bytes: &[u8]) {
        () = SubEncoder::<SubE, E>::CHECK;
        encode_into(&mut self.buf, bytes, SubE::TABLE);
    }

    /// Appends a byte that `E::TABLE` admits unencoded.
    ///
    /// # Panics
    ///
    /// Panics if the table does not admit `x`.
    pub fn push(&mut self, x: u8) {
        assert!(E::TABLE.allows(x), "table does not allow the byte");
        self.buf.push(char::from(x));
    }

    /// Unwraps the underlying `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }
}

impl<E: Encoder> Default for EString<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoder> Deref for EString<E> {
    type Target = EStr<E>;

    fn deref(&self) -> &EStr<E> {
        EStr::new_validated(&self.buf)
    }
}

impl<E: Encoder> AsRef<str> for EString<E> {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl<E: Encoder> PartialEq for EString<E> {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl<E: Encoder> Eq for EString<E> {}

impl<E: Encoder> PartialEq<str> for EString<E> {
    fn eq(&self, other: &str) -> bool {
        self.buf == other
    }
}

impl<E: Encoder> PartialEq<&str> for EString<E> {
    fn eq(&self, other: &&str) -> bool {
        self.buf == *other
    }
}

impl<E: Encoder> fmt::Debug for EString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.buf, f)
    }
}

impl<E: Encoder> fmt::Display for EString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}
