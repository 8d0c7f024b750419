#![no_main]
use libfuzzer_sys::fuzz_target;
use treematch::css::to_xpath;
use treematch::{Context, Document, Matcher};

fuzz_target!(|data: &[u8]| {
    if let Ok(selector) = std::str::from_utf8(data) {
        // Translation either fails cleanly or yields an expression the
        // query engine accepts or rejects without panicking.
        if to_xpath(selector).is_ok() {
            if let Ok(doc) = Document::parse_html("<ul><li class=\"a\">1</li><li id=\"b\">2</li></ul>") {
                let ctx = Context::css();
                let _ = Matcher::multi(selector).invoke(doc.root(), Some(&ctx));
            }
        }
    }
});
