use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uri_splice::{
    parse,
    pct_enc::{self, table::*},
    *,
};

criterion_group!(
    benches,
    bench_enc,
    bench_dec,
    bench_parse,
    bench_parse_hier_part,
    bench_params_count,
    bench_params_find,
    bench_params_edit,
    bench_segments_edit,
);
criterion_main!(benches);

const ENC_CASE: &str = "te😃a 测1`~!@试#$%st^&+=";

fn bench_enc(c: &mut Criterion) {
    c.bench_function("enc", |b| {
        b.iter(|| pct_enc::encode(black_box(ENC_CASE.as_bytes()), QUERY_DATA))
    });
}

const DEC_CASE: &str = "te%F0%9F%98%83a%20%E6%B5%8B1%60~!@%E8%AF%95%23$%25st%5E&+=";

fn bench_dec(c: &mut Criterion) {
    c.bench_function("dec", |b| {
        b.iter(|| pct_enc::decode(black_box(DEC_CASE.as_bytes())))
    });
}

const PARSE_CASE: &str = "https://user@example.com/search?q=%E6%B5%8B%E8%AF%95#fragment";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| Url::parse(black_box(PARSE_CASE))));
}

fn bench_parse_hier_part(c: &mut Criterion) {
    c.bench_function("parse_hier_part", |b| {
        b.iter(|| parse::parse_hier_part(black_box(b"//[2001:db8::7]:8080/a/b/c/d/e")))
    });
}

const QUERY_CASE: &str = "http://example.com/?a=1&b=2&c=3&d=4&e=5&f=6&g=7&h=8&i=9&j=10";

fn bench_params_count(c: &mut Criterion) {
    let url = Url::parse(QUERY_CASE).unwrap();
    c.bench_function("params_count", |b| b.iter(|| black_box(&url).params().len()));
}

fn bench_params_find(c: &mut Criterion) {
    let url = Url::parse(QUERY_CASE).unwrap();
    c.bench_function("params_find", |b| {
        b.iter(|| {
            let params = black_box(&url).params();
            params.get(params.find("j"))
        })
    });
}

fn bench_params_edit(c: &mut Criterion) {
    let url = Url::parse(QUERY_CASE).unwrap();
    c.bench_function("params_edit", |b| {
        b.iter(|| {
            let mut url = url.clone();
            let params = url.params_mut();
            let e = params.find("e");
            params.replace_value(e, "five & a half");
            params.erase_all("b");
            params.push_back(("k", "11"));
            url
        })
    });
}

fn bench_segments_edit(c: &mut Criterion) {
    let url = Url::parse("http://example.com/a/b/c/d/e/f").unwrap();
    c.bench_function("segments_edit", |b| {
        b.iter(|| {
            let mut url = url.clone();
            let segments = url.segments_mut();
            let at = segments.nth_cursor(3);
            segments.insert(at, "new segment");
            segments.pop_back();
            segments.erase_all("b");
            url
        })
    });
}
