//! Fuzz test for cursor-context classification and extraction
//!
//! Every cursor position of every line is classified, and bindings are
//! extracted before it, without panicking.
//!
//! Run with: cargo +nightly fuzz run classifier_fuzz -- -max_total_time=60

#![no_main]

use dolphin_dsl::{classify, text, CompletionRequest, ExtractScope, Position, VariableExtractor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let extractor = VariableExtractor::default();
        let all = extractor.extract(input, ExtractScope::All);

        for (idx, line) in text::lines(input).enumerate().take(16) {
            for column in 1..=text::char_len(line) + 1 {
                let before = text::before_column(line, column);
                let context = classify(before, line);

                let request = CompletionRequest::new(line, Position::new(idx + 1, column));
                assert_eq!(request.context, context, "Request must classify like classify()");
                assert!(request.word_range().start_column <= column);

                let scoped = extractor.extract(
                    input,
                    ExtractScope::BeforeCursor(Position::new(idx + 1, column)),
                );
                assert!(scoped.len() <= all.len(), "Scoped extraction is a prefix");
            }
        }
    }
});
