use quickcheck::QuickCheck;
use uri_splice::{Param, Part, Url};

fn parts_sum(url: &Url) -> usize {
    [
        Part::Scheme,
        Part::Userinfo,
        Part::Host,
        Part::Port,
        Part::Path,
        Part::Query,
        Part::Fragment,
    ]
    .into_iter()
    .map(|p| url.part_len(p))
    .sum()
}

fn p(key: &str, value: Option<&str>) -> Param {
    Param::new(key, value)
}

#[test]
fn read_elements() {
    let url = Url::parse("http://h/?a=1&b&c=&k=a=b&%20x=%26#f").unwrap();
    let params = url.params();
    assert_eq!(params.len(), 5);
    assert!(params.iter().eq([
        p("a", Some("1")),
        p("b", None),
        p("c", Some("")),
        p("k", Some("a=b")),
        p(" x", Some("&")),
    ]));
    assert_eq!(params.front(), Some(p("a", Some("1"))));
    assert_eq!(params.back(), Some(p(" x", Some("&"))));
    assert_eq!(params.nth(3), p("k", Some("a=b")));
    assert!(params.contains(" x"));
    assert!(!params.contains("%20x"));
    assert_eq!(params.count("b"), 1);

    let e = params.at(5).unwrap_err();
    assert_eq!(e.index(), 5);
    assert_eq!(e.view_len(), 5);

    assert!(!params.get(params.find("b")).unwrap().has_value());
    assert_eq!(params.get(params.end()), None);
    assert_eq!(params.find("nope"), params.end());
}

#[test]
fn empty_and_absent() {
    let url = Url::parse("/p").unwrap();
    assert!(url.params().is_empty());
    assert_eq!(url.params().len(), 0);
    assert_eq!(url.params().begin(), url.params().end());
    assert_eq!(url.params().front(), None);

    let url = Url::parse("/p?").unwrap();
    assert!(!url.params().is_empty());
    assert_eq!(url.params().len(), 1);
    assert_eq!(url.params().front(), Some(Param::default()));

    let url = Url::parse("/p?a=1&").unwrap();
    assert_eq!(url.params().len(), 2);
    assert_eq!(url.params().nth(1), Param::default());

    let url = Url::parse("/p?&&").unwrap();
    assert_eq!(url.params().len(), 3);
}

#[test]
fn cursors() {
    let url = Url::parse("?a=1&b&a=2").unwrap();
    let params = url.params();
    let begin = params.begin();
    assert_eq!(begin.offset(), 0);
    let b = params.next(begin);
    assert_eq!(b.offset(), 4);
    assert_eq!(b, params.nth_cursor(1));
    assert_eq!(params.next(params.end()), params.end());
    assert_eq!(params.nth_cursor(9), params.end());

    let first = params.find("a");
    assert_eq!(first, begin);
    let second = params.find_from(params.next(first), "a");
    assert_eq!(params.get(second), Some(p("a", Some("2"))));
    assert_eq!(params.find_from(params.next(second), "a"), params.end());
}

#[test]
fn remove_and_replace_value() {
    let mut url = Url::parse("http://h/?a=1&b&c=2").unwrap();
    let params = url.params_mut();
    let b = params.find("b");
    assert_eq!(params.get(b), Some(p("b", None)));

    // Removing a value that is not there changes nothing.
    params.remove_value(b);
    assert_eq!(params.url().as_str(), "http://h/?a=1&b&c=2");

    params.replace_value(b, "3");
    assert_eq!(params.url().as_str(), "http://h/?a=1&b=3&c=2");
    assert_eq!(params.get(b), Some(p("b", Some("3"))));

    params.remove_value(b);
    assert_eq!(params.get(b), Some(p("b", None)));
    assert_eq!(url.as_str(), "http://h/?a=1&b&c=2");

    let params = url.params_mut();
    let a = params.begin();
    params.replace_value(a, "x&y=z");
    assert_eq!(url.as_str(), "http://h/?a=x%26y%3Dz&b&c=2");
    assert_eq!(parts_sum(&url), url.as_str().len());
}

#[test]
fn insert_into_absent_query() {
    let mut url = Url::parse("/path#frag").unwrap();
    let params = url.params_mut();
    let end = params.end();
    let c = params.insert(end, ("x", "y"));
    assert_eq!(params.get(c), Some(p("x", Some("y"))));
    assert_eq!(url.as_str(), "/path?x=y#frag");
    assert!(url.has_query());
    assert_eq!(url.query().unwrap(), "x=y");
    assert_eq!(url.fragment().unwrap(), "frag");
}

#[test]
fn insert_positions() {
    let mut url = Url::parse("?b").unwrap();
    let params = url.params_mut();
    let begin = params.begin();
    params.insert(begin, ("a", "1"));
    assert_eq!(params.url().as_str(), "?a=1&b");
    let end = params.end();
    params.insert(end, "d");
    let d = params.find("d");
    params.insert(d, ("c", None));
    assert_eq!(url.as_str(), "?a=1&b&c&d");

    // An empty query still holds an empty element.
    let mut url = Url::parse("?").unwrap();
    let params = url.params_mut();
    let begin = params.begin();
    params.insert(begin, "k");
    assert_eq!(url.as_str(), "?k&");
    assert_eq!(url.params().len(), 2);
}

#[test]
fn insert_encodes() {
    let mut url = Url::parse("http://h/").unwrap();
    let params = url.params_mut();
    params.push_back(("a b", "c&d=e+f"));
    params.push_back(("#", "?/"));
    assert_eq!(
        url.as_str(),
        "http://h/?a%20b=c%26d%3De%2Bf&%23=?/"
    );
    assert!(url.params().iter().eq([
        p("a b", Some("c&d=e+f")),
        p("#", Some("?/")),
    ]));
}

#[test]
fn insert_all_and_assign() {
    let mut url = Url::parse("?a&d").unwrap();
    let params = url.params_mut();
    let d = params.find("d");
    let first = params.insert_all(d, ["b", "c"]);
    assert_eq!(first, d);
    assert_eq!(params.get(first), Some(p("b", None)));
    assert_eq!(url.as_str(), "?a&b&c&d");

    let mut url = Url::parse("?x").unwrap();
    let params = url.params_mut();
    let begin = params.begin();
    params.insert_all(begin, [("a", "1"), ("b", "2")]);
    assert_eq!(url.as_str(), "?a=1&b=2&x");

    let mut url = Url::parse("http://h/?old#f").unwrap();
    url.params_mut()
        .assign(vec![("k", Some("v")), ("k2", None)]);
    assert_eq!(url.as_str(), "http://h/?k=v&k2#f");

    url.params_mut().assign(Vec::<&str>::new());
    assert_eq!(url.as_str(), "http://h/#f");
    assert!(!url.has_query());

    let owned = [p("x", Some("1")), p("y", None)];
    url.params_mut().assign(&owned);
    assert_eq!(url.as_str(), "http://h/?x=1&y#f");
}

#[test]
fn replace_elements() {
    let mut url = Url::parse("?a=1&b=2").unwrap();
    let params = url.params_mut();
    let b = params.find("b");
    params.replace(b, ("c", None));
    assert_eq!(params.url().as_str(), "?a=1&c");
    let begin = params.begin();
    params.replace(begin, ("x", "9"));
    assert_eq!(url.as_str(), "?x=9&c");

    let mut url = Url::parse("?a&b&c").unwrap();
    let params = url.params_mut();
    let (first, last) = (params.nth_cursor(1), params.nth_cursor(2));
    let c = params.replace_range(first, last, ["x", "y"]);
    assert_eq!(params.get(c), Some(p("x", None)));
    assert_eq!(url.as_str(), "?a&x&y&c");

    let mut url = Url::parse("?a&b").unwrap();
    let params = url.params_mut();
    let (first, last) = (params.begin(), params.end());
    params.replace_range(first, last, [("z", "0")]);
    assert_eq!(url.as_str(), "?z=0");
}

#[test]
fn emplace() {
    let mut url = Url::parse("s:").unwrap();
    let params = url.params_mut();
    let c = params.emplace_back("k", Some("v"));
    params.emplace_before(c, "j", None);
    let k = params.find("k");
    params.emplace_at(k, "k", Some("w w"));
    assert_eq!(url.as_str(), "s:?j&k=w%20w");
}

#[test]
fn erase_elements() {
    let mut url = Url::parse("?a&b&c&d").unwrap();
    let params = url.params_mut();
    let (first, last) = (params.nth_cursor(1), params.nth_cursor(3));
    let c = params.erase_range(first, last);
    assert_eq!(params.get(c), Some(p("d", None)));
    assert_eq!(url.as_str(), "?a&d");

    let mut url = Url::parse("?a&b&c").unwrap();
    let params = url.params_mut();
    let (first, last) = (params.begin(), params.nth_cursor(2));
    params.erase_range(first, last);
    assert_eq!(url.as_str(), "?c");

    let params = url.params_mut();
    let (first, last) = (params.begin(), params.begin());
    params.erase_range(first, last);
    assert_eq!(url.as_str(), "?c");

    let params = url.params_mut();
    let (first, last) = (params.begin(), params.end());
    let c = params.erase_range(first, last);
    assert_eq!(c, params.end());
    assert_eq!(url.as_str(), "");
    assert!(!url.has_query());

    let mut url = Url::parse("?a=1&b=2#f").unwrap();
    let params = url.params_mut();
    let last = params.nth_cursor(1);
    let c = params.erase(last);
    assert_eq!(c, params.end());
    assert_eq!(url.as_str(), "?a=1#f");
}

#[test]
fn erase_all_keeps_order() {
    let mut url = Url::parse("http://h/?a=1&b=2&a=3&c&%61").unwrap();
    let count = url.params().count("a");
    assert_eq!(count, 3);
    assert_eq!(url.params_mut().erase_all("a"), count);
    assert_eq!(url.as_str(), "http://h/?b=2&c");
    assert!(url.params().iter().eq([p("b", Some("2")), p("c", None)]));

    assert_eq!(url.params_mut().erase_all("missing"), 0);
    assert_eq!(url.as_str(), "http://h/?b=2&c");

    let mut url = Url::parse("?x&x&x#f").unwrap();
    assert_eq!(url.params_mut().erase_all("x"), 3);
    assert_eq!(url.as_str(), "#f");
}

#[test]
fn pop_back_and_clear() {
    let mut url = Url::parse("?a=1&b").unwrap();
    let params = url.params_mut();
    assert_eq!(params.pop_back(), Some(p("b", None)));
    assert_eq!(params.pop_back(), Some(p("a", Some("1"))));
    assert_eq!(params.pop_back(), None);
    assert_eq!(url.as_str(), "");

    let mut url = Url::parse("http://h/p?a&b#f").unwrap();
    url.params_mut().clear();
    assert_eq!(url.as_str(), "http://h/p#f");
    assert!(url.params().is_empty());
}

#[test]
fn cursor_before_edit_stays_valid() {
    let mut url = Url::parse("?a=1&b=2&c=3&d=4").unwrap();
    let params = url.params_mut();
    let a = params.begin();
    let b = params.find("b");
    let c = params.find("c");

    params.erase(c);
    assert_eq!(params.get(a), Some(p("a", Some("1"))));
    assert_eq!(params.get(b), Some(p("b", Some("2"))));

    params.replace_value(b, "twenty");
    assert_eq!(params.get(a), Some(p("a", Some("1"))));
    assert_eq!(params.get(b), Some(p("b", Some("twenty"))));
    assert_eq!(url.as_str(), "?a=1&b=twenty&d=4");
}

#[test]
fn edits_keep_other_parts() {
    let mut url = Url::parse("https://u@h:1/p/q?a=1#frag").unwrap();
    let before: Vec<_> = [Part::Scheme, Part::Userinfo, Part::Host, Part::Port, Part::Path]
        .into_iter()
        .map(|part| url.part(part).to_owned())
        .collect();

    let params = url.params_mut();
    params.push_back(("b", "2"));
    let a = params.begin();
    params.erase(a);
    params.push_back("c");
    params.pop_back();

    let after: Vec<_> = [Part::Scheme, Part::Userinfo, Part::Host, Part::Port, Part::Path]
        .into_iter()
        .map(|part| url.part(part).to_owned())
        .collect();
    assert_eq!(before, after);
    assert_eq!(url.part(Part::Fragment), "#frag");
    assert_eq!(url.as_str(), "https://u@h:1/p/q?b=2#frag");
    assert_eq!(parts_sum(&url), url.as_str().len());
}

#[test]
fn debug_lists_elements() {
    let url = Url::parse("?a=1&b").unwrap();
    assert_eq!(
        format!("{:?}", url.params()),
        r#"[Param { key: "a", value: Some("1") }, Param { key: "b", value: None }]"#
    );
}

#[test]
fn push_back_round_trip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(elems: Vec<(String, Option<String>)>) -> bool {
        let mut url = Url::parse("http://example.com/").unwrap();
        let params = url.params_mut();
        for (key, value) in &elems {
            params.push_back((key.as_str(), value.as_deref()));
        }

        let expected: Vec<_> = elems
            .iter()
            .map(|(k, v)| Param::new(k.as_str(), v.as_deref()))
            .collect();
        let reparsed = Url::parse(url.as_str()).unwrap();
        url.params().iter().eq(expected.iter().cloned())
            && reparsed.params().iter().eq(expected)
            && parts_sum(&url) == url.as_str().len()
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Vec<(String, Option<String>)>) -> bool);
}

#[test]
fn erase_all_quickcheck() {
    const KEYS: [&str; 4] = ["a", "b", "a b", "k&=+"];

    #[allow(clippy::needless_pass_by_value)]
    fn prop(elems: Vec<(u8, Option<String>)>, pick: u8) -> bool {
        let elems: Vec<_> = elems
            .iter()
            .map(|(k, v)| Param::new(KEYS[usize::from(k % 4)], v.as_deref()))
            .collect();
        let key = KEYS[usize::from(pick % 4)];

        let mut url = Url::parse("x:/p?#f").unwrap();
        url.params_mut().assign(&elems);
        let counted = url.params().count(key);

        let removed = url.params_mut().erase_all(key);
        let kept: Vec<_> = elems.iter().filter(|p| p.key != key).cloned().collect();
        let reparsed = Url::parse(url.as_str()).unwrap();

        removed == counted
            && removed == elems.len() - kept.len()
            && url.params().iter().eq(kept.iter().cloned())
            && reparsed.params().iter().eq(kept)
            && url.fragment().unwrap() == "f"
            && parts_sum(&url) == url.as_str().len()
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Vec<(u8, Option<String>)>, u8) -> bool);
}
