#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use linkmark::extractor::extract;
use linkmark::fetcher::RawPage;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data).to_string();
    let page = RawPage::from_html(Url::parse("https://example.com").unwrap(), html);

    // Garbage in must still produce a title
    let metadata = extract(&page);
    assert!(!metadata.title.is_empty());
});
