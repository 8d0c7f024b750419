#![allow(clippy::expect_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use treematch::css::to_xpath;
use treematch::parser::{parse, ParseMode};
use treematch::{Context, Document, Mapping, Matcher};

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Generates an HTML product listing with `count` products.
fn make_listing_html(count: usize) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html><head><title>Listing</title></head><body>\n<main>\n");
    for i in 0..count {
        let _ = writeln!(
            html,
            "  <div class=\"product\" data-sku=\"SKU{i}\">\
             <h2 class=\"name\">Product {i}</h2>\
             <span class=\"price\">{}.99 EUR</span>\
             <ul class=\"tags\"><li>tag{}</li><li>tag{}</li></ul></div>",
            10 + i,
            i % 7,
            i % 11
        );
    }
    html.push_str("</main>\n</body></html>\n");
    html
}

/// Generates an XML catalog with `count` books.
fn make_catalog_xml(count: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<catalog>\n");
    for i in 0..count {
        let _ = writeln!(
            xml,
            "  <book id=\"bk{i}\"><title>Title {i}</title>\
             <author>Author {i}</author>\
             <price>{}.99</price></book>",
            10 + i
        );
    }
    xml.push_str("</catalog>\n");
    xml
}

fn product_matcher() -> Matcher {
    Matcher::multi_each(
        "//div[@class='product']",
        Mapping::new()
            .field("sku", "@data-sku")
            .field("name", "h2")
            .field("price", Matcher::single("span[@class='price']").as_float())
            .field("tags", Matcher::multi("ul/li")),
    )
}

// ---------------------------------------------------------------------------
// Document loading
// ---------------------------------------------------------------------------

fn bench_load_html(c: &mut Criterion) {
    let html = make_listing_html(100);
    c.bench_function("load_html", |b| {
        b.iter(|| Document::parse_html(black_box(&html)).expect("parse failed"));
    });
}

fn bench_load_xml_bytes(c: &mut Criterion) {
    let xml = make_catalog_xml(1000);
    c.bench_function("load_xml_bytes", |b| {
        b.iter(|| parse(black_box(xml.as_bytes()), ParseMode::Xml).expect("parse failed"));
    });
}

// ---------------------------------------------------------------------------
// Matcher evaluation
// ---------------------------------------------------------------------------

fn bench_multi_text(c: &mut Criterion) {
    let doc = Document::parse_xml(&make_catalog_xml(1000)).expect("parse failed");
    let titles = Matcher::multi("//book/title");
    c.bench_function("multi_text", |b| {
        b.iter(|| titles.invoke(black_box(doc.root()), None).expect("eval failed"));
    });
}

fn bench_nested_records(c: &mut Criterion) {
    let doc = Document::parse_html(&make_listing_html(100)).expect("parse failed");
    let products = product_matcher();
    c.bench_function("nested_records", |b| {
        b.iter(|| products.invoke(black_box(doc.root()), None).expect("eval failed"));
    });
}

fn bench_seq_or(c: &mut Criterion) {
    let doc = Document::parse_xml(&make_catalog_xml(200)).expect("parse failed");
    let union = Matcher::multi("//title")
        .seq_or(&Matcher::multi("//author"))
        .expect("selector matchers");
    c.bench_function("seq_or", |b| {
        b.iter(|| union.invoke(black_box(doc.root()), None).expect("eval failed"));
    });
}

fn bench_regex(c: &mut Criterion) {
    let doc = Document::parse_html(&make_listing_html(100)).expect("parse failed");
    let prices = Matcher::multi("//span[@class='price']")
        .regex(r"(?<amount>[\d.]+) (?<currency>[A-Z]{3})")
        .expect("valid regex");
    c.bench_function("regex", |b| {
        b.iter(|| prices.invoke(black_box(doc.root()), None).expect("eval failed"));
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    let html = make_listing_html(100);
    let runner = product_matcher().from_html(None);
    c.bench_function("end_to_end", |b| {
        b.iter(|| runner.run(black_box(&html)).expect("run failed"));
    });
}

// ---------------------------------------------------------------------------
// CSS
// ---------------------------------------------------------------------------

fn bench_css_translate(c: &mut Criterion) {
    c.bench_function("css_translate", |b| {
        b.iter(|| {
            to_xpath(black_box(
                "main > div.product:nth-child(2n+1) ul.tags li:not(.hidden)::text, h2[class^='na']",
            ))
            .expect("valid selector")
        });
    });
}

fn bench_css_matcher(c: &mut Criterion) {
    let doc = Document::parse_html(&make_listing_html(100)).expect("parse failed");
    let ctx = Context::css();
    let names = Matcher::multi("div.product > h2.name");
    c.bench_function("css_matcher", |b| {
        b.iter(|| names.invoke(black_box(doc.root()), Some(&ctx)).expect("eval failed"));
    });
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(loading, bench_load_html, bench_load_xml_bytes);

criterion_group!(
    evaluation,
    bench_multi_text,
    bench_nested_records,
    bench_seq_or,
    bench_regex,
    bench_end_to_end,
);

criterion_group!(css, bench_css_translate, bench_css_matcher);

criterion_main!(loading, evaluation, css);
