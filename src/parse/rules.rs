//! Primitive productions.

use super::{err, Element, Reader, Result, Rule, Span};
use crate::pct_enc::{self, table::*};
use core::net::{Ipv4Addr, Ipv6Addr};

/// A span of percent-encoded text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PctSpan {
    /// The span of the still-encoded text.
    pub span: Span,
    /// Whether the text contains any percent-encoded octet,
    /// that is, whether it needs decoding.
    pub encoded: bool,
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
#[derive(Clone, Copy, Debug)]
pub struct Scheme(());

impl Rule for Scheme {
    type Output = Span;
    const NAME: &'static str = "scheme";

    fn parse(r: &mut Reader<'_>) -> Result<Span> {
        let start = r.pos();
        match r.peek(0) {
            Some(x) if x.is_ascii_alphabetic() => {}
            _ => err!(start, ExpectedScheme, Self::NAME),
        }
        r.read(SCHEME, Self::NAME)?;
        Ok(Span::new(start, r.pos()))
    }
}

/// `pct-encoded = "%" HEXDIG HEXDIG`
///
/// Outputs the decoded octet.
#[derive(Clone, Copy, Debug)]
pub struct PctEncoded(());

impl Rule for PctEncoded {
    type Output = u8;
    const NAME: &'static str = "pct-encoded";

    fn parse(r: &mut Reader<'_>) -> Result<u8> {
        let start = r.pos();
        if r.peek(0) != Some(b'%') {
            err!(start, UnexpectedChar, Self::NAME);
        }
        match (r.peek(1), r.peek(2)) {
            (Some(hi), Some(lo)) if pct_enc::is_hexdig_pair(hi, lo) => {
                // INVARIANT: Skipping a percent-encoded octet is fine.
                r.skip(3);
                Ok(pct_enc::decode_octet(hi, lo))
            }
            _ => err!(start, InvalidPercentEncoding, Self::NAME),
        }
    }
}

/// `userinfo = *( unreserved / pct-encoded / sub-delims / ":" )`
#[derive(Clone, Copy, Debug)]
pub struct Userinfo(());

impl Rule for Userinfo {
    type Output = PctSpan;
    const NAME: &'static str = "userinfo";

    fn parse(r: &mut Reader<'_>) -> Result<PctSpan> {
        r.read_encoded(USERINFO, Self::NAME)
    }
}

/// The kind of a parsed host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// An IPv4 address.
    Ipv4(Ipv4Addr),
    /// An IPv6 address.
    Ipv6(Ipv6Addr),
    /// An IP address of future version.
    IpvFuture,
    /// A registered name.
    RegName,
}

/// The parsed host subcomponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HostParts {
    /// The whole host, including the square brackets of an IP literal.
    pub span: Span,
    /// The kind of the host.
    pub kind: HostKind,
}

/// `host = IP-literal / IPv4address / reg-name`
///
/// An IPv4 address is preferred over a registered name when both match.
#[derive(Clone, Copy, Debug)]
pub struct Host(());

impl Rule for Host {
    type Output = HostParts;
    const NAME: &'static str = "host";

    fn parse(r: &mut Reader<'_>) -> Result<HostParts> {
        let start = r.pos();
        let kind = match read_ip_literal(r)? {
            Some(kind) => kind,
            None => {
                // Every byte of an IPv4 address is also allowed in a registered name,
                // so reading may go on from wherever the address ended.
                let addr = read_v4(r);
                let more = r.read(REG_NAME, Self::NAME)?;
                match addr {
                    Some(addr) if !more => HostKind::Ipv4(addr),
                    _ => HostKind::RegName,
                }
            }
        };
        Ok(HostParts {
            span: Span::new(start, r.pos()),
            kind,
        })
    }
}

/// `port = *DIGIT`
#[derive(Clone, Copy, Debug)]
pub struct Port(());

impl Rule for Port {
    type Output = Span;
    const NAME: &'static str = "port";

    fn parse(r: &mut Reader<'_>) -> Result<Span> {
        let start = r.pos();
        r.read(PORT, Self::NAME)?;
        Ok(Span::new(start, r.pos()))
    }
}

/// `segment = *pchar`
#[derive(Clone, Copy, Debug)]
pub struct Segment(());

impl Rule for Segment {
    type Output = PctSpan;
    const NAME: &'static str = "segment";

    fn parse(r: &mut Reader<'_>) -> Result<PctSpan> {
        r.read_encoded(SEGMENT, Self::NAME)
    }
}

impl Element for Segment {
    const DELIM: u8 = b'/';
}

/// The key and the optional value of a query element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParamSpans {
    /// The key, before the first `"="`.
    pub key: PctSpan,
    /// The value, after the first `"="`.
    ///
    /// `None` if the element has no `"="` at all.
    pub value: Option<PctSpan>,
}

/// A query element: `key [ "=" value ]`, stopping at `"&"` or `"#"`.
///
/// The key ends at the first unescaped `"="`, and the value runs to the
/// end of the element, so it may itself contain `"="`.
#[derive(Clone, Copy, Debug)]
pub struct QueryParam(());

impl Rule for QueryParam {
    type Output = ParamSpans;
    const NAME: &'static str = "query";

    fn parse(r: &mut Reader<'_>) -> Result<ParamSpans> {
        let key = r.read_encoded(QUERY_KEY, Self::NAME)?;
        let value = if r.read_str("=") {
            Some(r.read_encoded(QUERY_PARAM, Self::NAME)?)
        } else {
            None
        };
        Ok(ParamSpans { key, value })
    }
}

impl Element for QueryParam {
    const DELIM: u8 = b'&';
}

/// `fragment = *( pchar / "/" / "?" )`
#[derive(Clone, Copy, Debug)]
pub struct Fragment(());

impl Rule for Fragment {
    type Output = PctSpan;
    const NAME: &'static str = "fragment";

    fn parse(r: &mut Reader<'_>) -> Result<PctSpan> {
        r.read_encoded(FRAGMENT, Self::NAME)
    }
}

// IP-literal = "[" ( IPv6address / IPvFuture ) "]"
fn read_ip_literal(r: &mut Reader<'_>) -> Result<Option<HostKind>> {
    if !r.read_str("[") {
        return Ok(None);
    }

    let start = r.pos();
    let kind = if let Some(addr) = read_v6(r) {
        HostKind::Ipv6(addr)
    } else if r.pos() == start {
        read_ipv_future(r)?;
        HostKind::IpvFuture
    } else {
        err!(start, InvalidHost, Host::NAME);
    };

    if !r.read_str("]") {
        err!(r.pos(), UnexpectedChar, Host::NAME);
    }
    Ok(Some(kind))
}

// IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )
fn read_ipv_future(r: &mut Reader<'_>) -> Result<()> {
    if let Some(b'v' | b'V') = r.peek(0) {
        // INVARIANT: Skipping "v" or "V" is fine.
        r.skip(1);
        if r.read(HEXDIG, Host::NAME)? && r.read_str(".") && r.read(IPV_FUTURE, Host::NAME)? {
            return Ok(());
        }
    }
    err!(r.pos(), UnexpectedChar, Host::NAME);
}

enum V6Piece {
    // A group of up to four hexadecimal digits, and whether it follows a colon.
    Group(u16, bool),
    // "::"
    Ellipsis,
    // Digits followed by a dot, and whether they follow a colon.
    MaybeV4(bool),
    // A colon followed by neither a digit nor another colon.
    LoneColon,
}

fn read_v6(r: &mut Reader<'_>) -> Option<Ipv6Addr> {
    let mut groups = [0u16; 8];
    let mut ellipsis = None;
    let mut n = 0;

    while n < 8 {
        let Some(piece) = read_v6_piece(r) else {
            break;
        };
        match piece {
            V6Piece::Group(x, colon) => {
                // A colon must separate groups, except right after an ellipsis.
                if colon == (n == 0 || ellipsis == Some(n)) {
                    return None;
                }
                groups[n] = x;
                n += 1;
            }
            V6Piece::Ellipsis => {
                if ellipsis.is_some() {
                    return None;
                }
                ellipsis = Some(n);
            }
            V6Piece::MaybeV4(colon) => {
                if n > 6 || colon == (ellipsis == Some(n)) {
                    return None;
                }
                let [a, b, c, d] = read_v4(r)?.octets();
                groups[n] = u16::from_be_bytes([a, b]);
                groups[n + 1] = u16::from_be_bytes([c, d]);
                n += 2;
                break;
            }
            V6Piece::LoneColon => return None,
        }
    }

    match ellipsis {
        None if n != 8 => return None,
        None => {}
        // An ellipsis must stand for at least one group.
        Some(_) if n == 8 => return None,
        Some(at) => {
            groups.copy_within(at..n, 8 - (n - at));
            groups[at..8 - (n - at)].fill(0);
        }
    }
    Some(Ipv6Addr::from(groups))
}

// Returns `None` when no group can be read.
fn read_v6_piece(r: &mut Reader<'_>) -> Option<V6Piece> {
    let colon = r.read_str(":");
    let Some(first) = r.peek(0) else {
        return colon.then_some(V6Piece::LoneColon);
    };

    let Some(mut x) = pct_enc::decode_hexdigit(first).map(u16::from) else {
        return colon.then(|| {
            if first == b':' {
                // INVARIANT: Skipping ":" is fine.
                r.skip(1);
                V6Piece::Ellipsis
            } else {
                V6Piece::LoneColon
            }
        });
    };

    let mut i = 1;
    while i < 4 {
        let Some(b) = r.peek(i) else {
            // INVARIANT: Skipping `i` hexadecimal digits is fine.
            r.skip(i);
            return None;
        };
        match pct_enc::decode_hexdigit(b) {
            Some(v) => {
                x = (x << 4) | u16::from(v);
                i += 1;
            }
            None if b == b'.' => return Some(V6Piece::MaybeV4(colon)),
            None => break,
        }
    }
    // INVARIANT: Skipping `i` hexadecimal digits is fine.
    r.skip(i);
    Some(V6Piece::Group(x, colon))
}

fn read_v4(r: &mut Reader<'_>) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        if i > 0 && !r.read_str(".") {
            return None;
        }
        *octet = read_v4_octet(r)?;
    }
    Some(Ipv4Addr::from(octets))
}

// dec-octet = DIGIT / %x31-39 DIGIT / "1" 2DIGIT / "2" %x30-34 DIGIT / "25" %x30-35
fn read_v4_octet(r: &mut Reader<'_>) -> Option<u8> {
    let first = peek_digit(r, 0)?;
    if first == 0 {
        // INVARIANT: Skipping "0" is fine.
        r.skip(1);
        return Some(0);
    }

    let mut res = first;
    let mut i = 1;
    while i < 3 {
        let Some(x) = peek_digit(r, i) else { break };
        res = res * 10 + x;
        i += 1;
    }
    // INVARIANT: Skipping `i` digits is fine.
    r.skip(i);
    u8::try_from(res).ok()
}

fn peek_digit(r: &Reader<'_>, i: usize) -> Option<u32> {
    r.peek(i).and_then(|x| (x as char).to_digit(10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_all;

    #[test]
    fn ipv6() {
        let v6 = |s: &str| match parse_all::<Host>(s.as_bytes()) {
            Ok(HostParts {
                kind: HostKind::Ipv6(addr),
                ..
            }) => Some(addr),
            _ => None,
        };

        assert_eq!(v6("[::]"), Some(Ipv6Addr::UNSPECIFIED));
        assert_eq!(v6("[::1]"), Some(Ipv6Addr::LOCALHOST));
        assert_eq!(
            v6("[2001:db8::7]"),
            Some(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 7))
        );
        assert_eq!(
            v6("[1:2:3:4:5:6:7:8]"),
            Some(Ipv6Addr::new(1, 2, 3, 4, 5, 6, 7, 8))
        );
        assert_eq!(
            v6("[::ffff:192.0.2.128]"),
            Some(Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0xc000, 0x280))
        );
        assert_eq!(v6("[1::]"), Some(Ipv6Addr::new(1, 0, 0, 0, 0, 0, 0, 0)));

        assert_eq!(v6("[1:2:3:4:5:6:7]"), None);
        assert_eq!(v6("[1:2:3:4:5:6:7:8:9]"), None);
        assert_eq!(v6("[1::2::3]"), None);
        assert_eq!(v6("[:1::]"), None);
        assert_eq!(v6("[1:2:3:4::5:6:7:8]"), None);
        assert_eq!(v6("[12345::]"), None);
    }

    #[test]
    fn ipv4_or_reg_name() {
        let kind = |s: &str| parse_all::<Host>(s.as_bytes()).map(|h| h.kind);

        assert_eq!(kind("127.0.0.1"), Ok(HostKind::Ipv4(Ipv4Addr::LOCALHOST)));
        assert_eq!(kind("255.255.255.255"), Ok(HostKind::Ipv4(Ipv4Addr::BROADCAST)));
        assert_eq!(kind("256.0.0.1"), Ok(HostKind::RegName));
        assert_eq!(kind("1.2.3"), Ok(HostKind::RegName));
        assert_eq!(kind("1.2.3.4.5"), Ok(HostKind::RegName));
        assert_eq!(kind("01.2.3.4"), Ok(HostKind::RegName));
        assert_eq!(kind("example.com"), Ok(HostKind::RegName));
        assert_eq!(kind(""), Ok(HostKind::RegName));
        assert_eq!(kind("[v1.fe:x]"), Ok(HostKind::IpvFuture));
    }

    #[test]
    fn query_param() {
        let p = parse_all::<QueryParam>(b"a=b=c").unwrap();
        assert_eq!(p.key.span, Span::new(0, 1));
        assert_eq!(p.value.unwrap().span, Span::new(2, 5));

        let p = parse_all::<QueryParam>(b"k%3D").unwrap();
        assert!(p.key.encoded);
        assert_eq!(p.value, None);

        let p = parse_all::<QueryParam>(b"=").unwrap();
        assert!(p.key.span.is_empty());
        assert!(p.value.unwrap().span.is_empty());
    }

    #[test]
    fn pct_encoded() {
        assert_eq!(parse_all::<PctEncoded>(b"%4a"), Ok(b'J'));
        let e = parse_all::<PctEncoded>(b"%4").unwrap_err();
        assert_eq!(e.index(), 0);
        assert_eq!(e.kind(), crate::ParseErrorKind::InvalidPercentEncoding);
    }
}
