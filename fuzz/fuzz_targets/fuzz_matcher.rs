#![no_main]
use libfuzzer_sys::fuzz_target;
use treematch::parser::{parse, ParseMode};
use treematch::{Mapping, Matcher};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a document: loading and matching must never panic.
    let matcher = Matcher::single(
        Mapping::new()
            .field("title", "//title")
            .field("links", Matcher::multi("//a/@href"))
            .field("count", Matcher::count("//*").as_int()),
    );
    for mode in [ParseMode::Html, ParseMode::Xml] {
        if let Ok(doc) = parse(data, mode) {
            let _ = matcher.invoke(doc.root(), None);
        }
    }
});
