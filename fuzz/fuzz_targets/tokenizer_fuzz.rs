//! Fuzz test for the Dolphin tokenizer and validator
//!
//! Arbitrary UTF-8 input must tokenize without panicking, with tokens that
//! tile every line exactly, and must validate without panicking.
//!
//! Run with: cargo +nightly fuzz run tokenizer_fuzz -- -max_total_time=60

#![no_main]

use dolphin_dsl::{text, Tokenizer, ValidationRules, Validator, DslGrammarConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokenizer = Tokenizer::default();

        for (line, tokens) in text::lines(input).zip(tokenizer.tokenize(input)) {
            let mut end = 0;
            for token in &tokens {
                assert_eq!(token.span.start, end, "Tokens must be contiguous");
                assert!(!token.text.is_empty(), "Tokens must not be empty");
                assert!(token.span.column >= 1, "Column numbers should be >= 1");
                end = token.span.end;
            }
            assert_eq!(end, line.len(), "Tokens must cover the whole line");
        }

        let validator = Validator::new(DslGrammarConfig::shared(), ValidationRules::all());
        for diagnostic in validator.validate(input) {
            assert!(diagnostic.range.start_line >= 1, "Line numbers should be >= 1");
        }
    }
});
