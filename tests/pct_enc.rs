use quickcheck::QuickCheck;
use quickcheck_macros::quickcheck;
use uri_splice::pct_enc::{
    self,
    encoder::{Fragment, Param, Path, Query, Segment, SegmentNzNc},
    table::*,
    EStr, EString,
};

#[test]
fn encode() {
    assert_eq!(pct_enc::encode(b"", PCHAR), "");
    assert_eq!(pct_enc::encode(b"abc-._~", UNRESERVED), "abc-._~");
    assert_eq!(pct_enc::encode(b"a b", PCHAR), "a%20b");
    assert_eq!(pct_enc::encode(b"a/b", SEGMENT), "a%2Fb");
    assert_eq!(pct_enc::encode(b"a/b", PATH), "a/b");
    assert_eq!(pct_enc::encode(b"x:y", SEGMENT_NZ_NC), "x%3Ay");
    assert_eq!(pct_enc::encode(b"1+1=2&3", QUERY_DATA), "1%2B1%3D2%263");
    assert_eq!(pct_enc::encode(b"%41", QUERY), "%2541");
    assert_eq!(pct_enc::encode("\u{e9}".as_bytes(), QUERY), "%C3%A9");
}

#[test]
fn decode() {
    assert_eq!(&*pct_enc::decode(b"").unwrap(), b"");
    assert_eq!(&*pct_enc::decode(b"plain").unwrap(), b"plain");
    assert_eq!(&*pct_enc::decode(b"%41%42c").unwrap(), b"ABc");
    assert_eq!(&*pct_enc::decode(b"%c3%A9").unwrap(), "\u{e9}".as_bytes());
    assert_eq!(&*pct_enc::decode(b"a+b").unwrap(), b"a+b");

    assert_eq!(pct_enc::decode(b"%").unwrap_err().index(), 0);
    assert_eq!(pct_enc::decode(b"ab%4").unwrap_err().index(), 2);
    assert_eq!(pct_enc::decode(b"%41%g1").unwrap_err().index(), 3);
}

#[test]
fn estr_decode() {
    let s = EStr::<Query>::new_or_panic("a%20b%26c");
    assert!(!s.is_unencoded());
    assert_eq!(s.decode().to_string().unwrap(), "a b&c");
    assert!(s.decode().eq_decoded(b"a b&c"));
    assert!(!s.decode().eq_decoded(b"a b&"));
    assert!(!s.decode().eq_decoded(b"a b&cd"));
    assert!(!s.decode().eq_decoded(b"a%20b&c"));

    let s = EStr::<Path>::new_or_panic("%FF");
    assert!(s.decode().to_string().is_err());
    assert_eq!(s.decode().to_string_lossy(), "\u{fffd}");

    assert!(EStr::<Path>::new("a?b").is_none());
    assert!(EStr::<Fragment>::new("a?b").is_some());
    assert!(EStr::<Query>::new("%zz").is_none());
}

#[test]
fn estring_encode() {
    let mut buf = EString::<Query>::new();
    buf.encode_str::<Param>("k y");
    buf.push(b'=');
    buf.encode_str::<Param>("v&w");
    assert_eq!(buf, "k%20y=v%26w");

    let mut buf = EString::<Path>::new();
    buf.encode_str::<SegmentNzNc>("a:b");
    buf.push(b'/');
    buf.encode_str::<Segment>("c/d:e");
    assert_eq!(buf, "a%3Ab/c%2Fd:e");
}

#[test]
#[should_panic = "table does not allow the byte"]
fn estring_push_disallowed() {
    let mut buf = EString::<Path>::new();
    buf.push(b'?');
}

#[test]
fn encode_decode_quickcheck() {
    fn prop(s: String) -> bool {
        [PCHAR, SEGMENT, SEGMENT_NZ_NC, QUERY_DATA, FRAGMENT]
            .into_iter()
            .all(|table| {
                let encoded = pct_enc::encode(s.as_bytes(), table);
                let allowed = encoded.bytes().all(|x| x == b'%' || table.allows(x));
                allowed && *pct_enc::decode(encoded.as_bytes()).unwrap() == *s.as_bytes()
            })
    }

    QuickCheck::new()
        .tests(1_000)
        .quickcheck(prop as fn(String) -> bool);
}

#[quickcheck]
fn eq_decoded_matches_decode(s: String) -> bool {
    let encoded = pct_enc::encode(s.as_bytes(), QUERY_DATA);
    let estr = EStr::<Query>::new_or_panic(&encoded);
    estr.decode().eq_decoded(s.as_bytes()) && estr.decode().to_string_lossy() == s
}
