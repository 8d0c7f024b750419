//! Extraction from real-world document shapes.
//!
//! Smoke tests running typical scraping layouts against product listings,
//! article pages, Atom and RSS feeds, and legacy-encoded HTML.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use treematch::{Context, Extractor, Mapping, Matcher, PathSpec};

// --- HTML pages ---

const SHOP: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Garden Tools | Example Shop</title>
</head>
<body>
  <nav id="breadcrumbs"><a href="/">Home</a> &rsaquo; <a href="/garden">Garden</a></nav>
  <main>
    <h1>Garden Tools</h1>
    <div class="product" data-sku="SP-01">
      <h2 class="name">Spade</h2>
      <span class="price">€ 24.90</span>
      <span class="stock">12 in stock</span>
      <ul class="features"><li>Steel blade</li><li>Ash handle</li></ul>
    </div>
    <div class="product sale" data-sku="RK-07">
      <h2 class="name">Rake</h2>
      <span class="price">€ 15.00</span>
      <span class="old-price">€ 19.00</span>
      <span class="stock">out of stock</span>
      <ul class="features"></ul>
    </div>
  </main>
</body>
</html>"#;

#[test]
fn test_product_listing() {
    let product = Mapping::new()
        .field("sku", "@data-sku")
        .field("name", "h2")
        .field("price", Matcher::single("span[@class='price']").regex(r"([\d.]+)").unwrap().first())
        .field("stock", Matcher::single("span[@class='stock']").as_int())
        .field("features", Matcher::multi("ul/li"))
        .field("on_sale", Matcher::has("self::*[contains(@class, 'sale')]"));
    let page = Matcher::single(
        Mapping::new()
            .field("title", "//title")
            .field("products", Matcher::multi_each("//div[contains(@class, 'product')]", product)),
    );

    let json = page.from_html(None).run(SHOP).unwrap();
    assert_eq!(
        json,
        json!({
            "title": "Garden Tools | Example Shop",
            "products": [
                {
                    "sku": "SP-01",
                    "name": "Spade",
                    "price": "24.90",
                    "stock": 12,
                    "features": ["Steel blade", "Ash handle"],
                    "on_sale": false,
                },
                {
                    "sku": "RK-07",
                    "name": "Rake",
                    "price": "15.00",
                    "stock": 0,
                    "features": [],
                    "on_sale": true,
                },
            ],
        })
    );
}

#[test]
fn test_product_listing_with_css() {
    let ctx = Context::css();
    let names = Matcher::multi("div.product h2.name").from_html(Some(ctx.clone()));
    assert_eq!(names.run(SHOP).unwrap(), json!(["Spade", "Rake"]));

    let crumbs = Matcher::multi("#breadcrumbs > a::attr(href)").from_html(Some(ctx.clone()));
    assert_eq!(crumbs.run(SHOP).unwrap(), json!(["/", "/garden"]));

    let sale = Matcher::single("div.product.sale span.old-price").from_html(Some(ctx));
    assert_eq!(sale.run(SHOP).unwrap(), json!("€ 19.00"));
}

#[test]
fn test_entities_decoded() {
    let crumbs = Matcher::single("//nav").from_html(None);
    assert_eq!(crumbs.run(SHOP).unwrap(), json!("Home \u{203a} Garden"));
}

const ARTICLE: &str = r#"<html><body>
<article>
  <header>
    <h1>  Parsing   the
      web  </h1>
    <time datetime="2024-03-01">March 1</time>
  </header>
  <p>First paragraph
     wraps here.</p>


  <p>Second   paragraph.</p>
  <table>
    <tr><th>Year</th><th>Pages</th></tr>
    <tr><td>2023</td><td>1,204</td></tr>
    <tr><td>2024</td><td>980</td></tr>
  </table>
</article>
</body></html>"#;

#[test]
fn test_article_text_extractors() {
    let title = Matcher::single("//h1");
    let oneline = title.with_extractor(Extractor::Oneline).from_html(None);
    assert_eq!(oneline.run(ARTICLE).unwrap(), json!("Parsing the web"));

    let paragraphs = Matcher::multi("//p").with_extractor(Extractor::Normalize).from_html(None);
    assert_eq!(
        paragraphs.run(ARTICLE).unwrap(),
        json!(["First paragraph\nwraps here.", "Second paragraph."])
    );
}

#[test]
fn test_table_rows() {
    // The HTML parser inserts `tbody`, so rows are found with `//`.
    let rows = Matcher::multi_each(
        "//table//tr[td]",
        Mapping::new()
            .field("year", Matcher::single("td[1]").as_int())
            .field("pages", "td[2]"),
    );
    assert_eq!(
        rows.from_html(None).run(ARTICLE).unwrap(),
        json!([{"year": 2023, "pages": "1,204"}, {"year": 2024, "pages": "980"}])
    );
    let header = Matcher::chain("//table//tr", [PathSpec::from(2)]);
    assert_eq!(header.from_html(None).run(ARTICLE).unwrap(), json!("Pages"));
}

#[test]
fn test_attribute_and_union() {
    let when = Matcher::single("//time/@datetime").or_else("//time");
    assert_eq!(when.from_html(None).run(ARTICLE).unwrap(), json!("2024-03-01"));

    let headings = Matcher::multi("//h1").seq_or(&Matcher::multi("//th")).unwrap();
    assert_eq!(
        headings.with_extractor(Extractor::Oneline).from_html(None).run(ARTICLE).unwrap(),
        json!(["Parsing the web", "Year", "Pages"])
    );
}

// --- Feeds ---

const ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Feed</title>
  <link href="http://example.org/"/>
  <updated>2025-12-13T18:30:02Z</updated>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <summary>Some text.</summary>
  </entry>
  <entry>
    <title>Second Entry</title>
    <link href="http://example.org/2003/12/14/atom04"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6b</id>
  </entry>
</feed>"#;

#[test]
fn test_atom_feed() {
    let ctx = Context::new().with_namespace("a", "http://www.w3.org/2005/Atom");
    let feed = Matcher::single(
        Mapping::new()
            .field("title", "/a:feed/a:title")
            .field(
                "entries",
                Matcher::multi_each(
                    "//a:entry",
                    Mapping::new()
                        .field("title", "a:title")
                        .field("link", "a:link/@href")
                        .field("summary", Matcher::single("a:summary").or_else(Matcher::constant(""))),
                ),
            ),
    );
    let json = feed.from_xml(Some(ctx)).run(ATOM).unwrap();
    assert_eq!(json["title"], "Example Feed");
    assert_eq!(
        json["entries"],
        json!([
            {
                "title": "Atom-Powered Robots Run Amok",
                "link": "http://example.org/2003/12/13/atom03",
                "summary": "Some text.",
            },
            {
                "title": "Second Entry",
                "link": "http://example.org/2003/12/14/atom04",
                "summary": "",
            },
        ])
    );
}

#[test]
fn test_atom_without_prefix_matches_nothing() {
    // Default-namespace elements are not matched by unprefixed names.
    let titles = Matcher::multi("//title").from_xml(None);
    assert_eq!(titles.run(ATOM).unwrap(), json!([]));
    let count = Matcher::single("count(//*[local-name() = 'entry'])").as_int().from_xml(None);
    assert_eq!(count.run(ATOM).unwrap(), json!(2));
}

#[test]
fn test_rss_feed() {
    let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example RSS</title>
    <item>
      <title>First Post</title>
      <link>http://example.org/first</link>
      <description>Hello &amp; welcome!</description>
    </item>
    <item>
      <title>Second Post</title>
      <link>http://example.org/second</link>
      <description><![CDATA[<b>bold</b> move]]></description>
    </item>
  </channel>
</rss>"#;
    let items = Matcher::multi_each(
        "//item",
        Mapping::new().field("title", "title").field("text", "description"),
    );
    assert_eq!(
        items.from_xml(None).run(rss).unwrap(),
        json!([
            {"title": "First Post", "text": "Hello & welcome!"},
            {"title": "Second Post", "text": "<b>bold</b> move"},
        ])
    );
    let version = Matcher::single("/rss/@version").as_float().from_xml(None);
    assert_eq!(version.run(rss).unwrap(), json!(2.0));
}

#[test]
fn test_xhtml_strict_page() {
    let xhtml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN"
  "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" lang="en">
  <head><title>Strict page</title></head>
  <body><ul><li>one</li><li>two</li></ul></body>
</html>"#;
    let ctx = Context::new().with_namespace("h", "http://www.w3.org/1999/xhtml");
    let page = Matcher::single(
        Mapping::new()
            .field("title", "//h:title")
            .field("items", Matcher::multi("//h:li")),
    );
    assert_eq!(
        page.from_xml(Some(ctx)).run(xhtml).unwrap(),
        json!({"title": "Strict page", "items": ["one", "two"]})
    );
}

// --- Encodings ---

#[test]
fn test_legacy_encoded_html() {
    let page = b"<html><head><meta charset=\"iso-8859-1\"></head><body><p>caf\xE9</p></body></html>";
    let m = Matcher::single("//p").from_html(None);
    assert_eq!(m.run_bytes(page).unwrap(), json!("caf\u{e9}"));
}

#[test]
fn test_utf16_xml() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<r><v>\u{3b1}</v></r>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let m = Matcher::single("//v").from_xml(None);
    assert_eq!(m.run_bytes(&bytes).unwrap(), json!("\u{3b1}"));
}
