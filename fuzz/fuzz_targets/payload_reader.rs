#![no_main]

use libfuzzer_sys::fuzz_target;
use neue::{HtmlOptions, MarkdownOptions, ReadOptions, Thread};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    for options in [ReadOptions::default(), ReadOptions::unrolled(), ReadOptions::strict()] {
        // Errors are fine; panics are not.
        if let Ok(thread) = Thread::from_json(s, &options) {
            let _ = thread.to_html(&HtmlOptions::default());
            let _ = thread.to_markdown(&MarkdownOptions::default());
            let _ = thread.to_markdown(&MarkdownOptions::placeholders());
        }
    }
});
