//! Allowed-byte tables for the productions of RFC 3986.
//!
//! Each constant is annotated with the ABNF rule it stands for.

use super::is_hexdig_pair;

/// A set of ASCII bytes that may appear unencoded, plus a flag telling
/// whether `%HH` octets may appear as well.
///
/// Bytes outside the set must be percent-encoded. Non-ASCII bytes are
/// never in the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Table {
    ascii: u128,
    pct_encoded: bool,
}

impl Table {
    /// Builds a table from a list of unencoded bytes.
    ///
    /// # Panics
    ///
    /// Panics if a byte is `b'%'` or not ASCII.
    #[must_use]
    pub const fn new(bytes: &[u8]) -> Self {
        let mut ascii = 0u128;
        let mut i = 0;
        while i < bytes.len() {
            let x = bytes[i];
            assert!(x.is_ascii() && x != b'%', "byte cannot be allowed unencoded");
            ascii |= 1 << x;
            i += 1;
        }
        Self {
            ascii,
            pct_encoded: false,
        }
    }

    /// Returns the union of two tables.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self {
            ascii: self.ascii | other.ascii,
            pct_encoded: self.pct_encoded | other.pct_encoded,
        }
    }

    /// Returns a copy that also admits percent-encoded octets.
    #[must_use]
    pub const fn or_pct_encoded(self) -> Self {
        Self {
            ascii: self.ascii,
            pct_encoded: true,
        }
    }

    /// Removes the unencoded bytes of `other` from this table.
    ///
    /// Whether percent-encoded octets are admitted is kept as is.
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self {
            ascii: self.ascii & !other.ascii,
            pct_encoded: self.pct_encoded,
        }
    }

    /// Checks whether everything this table admits is admitted by `other`.
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.ascii & !other.ascii == 0 && (!self.pct_encoded || other.pct_encoded)
    }

    /// Checks whether `x` may appear unencoded.
    #[inline]
    #[must_use]
    pub const fn allows(self, x: u8) -> bool {
        x < 128 && self.ascii & (1 << x) != 0
    }

    /// Checks whether `%HH` octets are admitted.
    #[inline]
    #[must_use]
    pub const fn allows_pct_encoded(self) -> bool {
        self.pct_encoded
    }

    /// Checks that every byte is admitted, reading `%HH` as one octet.
    pub(crate) const fn validate(self, s: &[u8]) -> bool {
        let mut i = 0;
        while i < s.len() {
            if s[i] == b'%' && self.pct_encoded {
                if i + 2 >= s.len() || !is_hexdig_pair(s[i + 1], s[i + 2]) {
                    return false;
                }
                i += 3;
            } else if self.allows(s[i]) {
                i += 1;
            } else {
                return false;
            }
        }
        true
    }
}

const fn of(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

/// `ALPHA = %x41-5A / %x61-7A`
pub const ALPHA: Table = of(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `DIGIT = %x30-39`
pub const DIGIT: Table = of(b"0123456789");

/// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`
pub const HEXDIG: Table = DIGIT.or(of(b"ABCDEFabcdef"));

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub const UNRESERVED: Table = ALPHA.or(DIGIT).or(of(b"-._~"));

/// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="`
pub const SUB_DELIMS: Table = of(b"!$&'()*+,;=");

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub const SCHEME: Table = ALPHA.or(DIGIT).or(of(b"+-."));

/// `userinfo = *( unreserved / pct-encoded / sub-delims / ":" )`
pub const USERINFO: Table = UNRESERVED.or(SUB_DELIMS).or(of(b":")).or_pct_encoded();

/// The tail of `IPvFuture`: `1*( unreserved / sub-delims / ":" )`
pub const IPV_FUTURE: Table = UNRESERVED.or(SUB_DELIMS).or(of(b":"));

/// `reg-name = *( unreserved / pct-encoded / sub-delims )`
pub const REG_NAME: Table = UNRESERVED.or(SUB_DELIMS).or_pct_encoded();

/// `port = *DIGIT`
pub const PORT: Table = DIGIT;

/// `pchar = unreserved / pct-encoded / sub-delims / ":" / "@"`
pub const PCHAR: Table = UNRESERVED.or(SUB_DELIMS).or(of(b":@")).or_pct_encoded();

/// `segment = *pchar`
pub const SEGMENT: Table = PCHAR;

/// `segment-nz-nc = 1*( unreserved / pct-encoded / sub-delims / "@" )`
pub const SEGMENT_NZ_NC: Table = PCHAR.sub(of(b":"));

/// `path = *( pchar / "/" )`
pub const PATH: Table = PCHAR.or(of(b"/"));

/// `query = *( pchar / "/" / "?" )`
pub const QUERY: Table = PCHAR.or(of(b"/?"));

/// One `&`-separated element of a query.
pub const QUERY_PARAM: Table = QUERY.sub(of(b"&"));

/// The key of a query element, which stops at `=`.
pub const QUERY_KEY: Table = QUERY_PARAM.sub(of(b"="));

/// Data stored in a query key or value. `+` is excluded so that it
/// never reads as an encoded space.
pub const QUERY_DATA: Table = QUERY.sub(of(b"&=+"));

/// `fragment = *( pchar / "/" / "?" )`
pub const FRAGMENT: Table = QUERY;
