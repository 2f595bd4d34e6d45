//! Fuzz target for filter document parsing.
//!
//! Feeds arbitrary bytes through the BSON reader and, when they decode to a
//! document, through the filter parser. Parsing must never panic and must be
//! stable: re-parsing a compiled tree yields the same tree.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_parse
//! ```

#![no_main]

use bson::Document;
use libfuzzer_sys::fuzz_target;
use quarry_filter::ordering::{greater_than, less_than};
use quarry_filter::{Filter, MultiKeyStrategy, ParseConfig};

fuzz_target!(|data: &[u8]| {
    // The comparator accepts any byte sequences.
    let (lhs, rhs) = data.split_at(data.len() / 2);
    assert!(!(less_than(lhs, rhs) && greater_than(lhs, rhs)));

    let Ok(doc) = Document::from_reader(data) else {
        return;
    };

    for strategy in [MultiKeyStrategy::Passthrough, MultiKeyStrategy::Conjunction] {
        let config = ParseConfig {
            multi_key: strategy,
            ..ParseConfig::default()
        };

        let filter = Filter::from_document_with(&doc, &config);
        let compiled = filter.to_document();
        let reparsed = Filter::from_document_with(&compiled, &config);

        assert_eq!(reparsed, filter);
    }
});
