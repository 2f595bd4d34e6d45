//! Fuzz target for filter construction.
//!
//! This target generates arbitrary filter trees through the combinators to
//! find panics in compilation and to check the identity rules.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_construction
//! ```

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bson::Bson;
use libfuzzer_sys::fuzz_target;
use quarry_filter::{BsonType, Filter, field};

/// A fuzzable filter value.
#[derive(Debug, Arbitrary, Clone)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f64),
    String(String),
    List(Vec<FuzzValue>),
}

impl From<FuzzValue> for Bson {
    fn from(val: FuzzValue) -> Self {
        match val {
            FuzzValue::Null => Bson::Null,
            FuzzValue::Bool(b) => Bson::Boolean(b),
            FuzzValue::Int(i) => Bson::Int32(i),
            FuzzValue::Long(i) => Bson::Int64(i),
            FuzzValue::Float(f) => Bson::Double(f),
            FuzzValue::String(s) => Bson::String(s),
            FuzzValue::List(list) => Bson::Array(list.into_iter().map(Bson::from).collect()),
        }
    }
}

/// A fuzzable filter.
#[derive(Debug, Arbitrary)]
enum FuzzFilter {
    Nothing,
    Equals(String, FuzzValue),
    NotEquals(String, FuzzValue),
    Lt(String, FuzzValue),
    Gte(String, FuzzValue),
    In(String, Vec<FuzzValue>),
    Exists(String, bool),
    TypeIs(String, i8),
    Contains(String, String),
    StartsWith(String, String),
    ElemMatch(String, Box<FuzzFilter>),
    And(Vec<FuzzFilter>),
    Or(Vec<FuzzFilter>),
    Not(Box<FuzzFilter>),
}

impl FuzzFilter {
    fn to_filter(self, depth: usize) -> Filter {
        // Limit recursion depth to prevent stack overflow
        if depth > 10 {
            return Filter::Nothing;
        }

        match self {
            FuzzFilter::Nothing => Filter::Nothing,
            FuzzFilter::Equals(key, val) => field(key).eq(val),
            FuzzFilter::NotEquals(key, val) => field(key).ne(val),
            FuzzFilter::Lt(key, val) => field(key).lt(val),
            FuzzFilter::Gte(key, val) => field(key).gte(val),
            FuzzFilter::In(key, vals) => field(key).is_in(vals.into_iter().take(10)),
            FuzzFilter::Exists(key, exists) => field(key).exists(exists),
            FuzzFilter::TypeIs(key, code) => {
                let ty = BsonType::from_code(i32::from(code)).unwrap_or(BsonType::Number);
                field(key).type_is(ty)
            }
            FuzzFilter::Contains(key, pattern) => field(key).contains(pattern),
            FuzzFilter::StartsWith(key, pattern) => field(key).starts_with(pattern),
            FuzzFilter::ElemMatch(key, nested) => field(key).elem_match(nested.to_filter(depth + 1)),
            FuzzFilter::And(filters) => Filter::all_of(
                filters
                    .into_iter()
                    .take(10) // Limit children
                    .map(|f| f.to_filter(depth + 1)),
            ),
            FuzzFilter::Or(filters) => Filter::any_of(
                filters
                    .into_iter()
                    .take(10) // Limit children
                    .map(|f| f.to_filter(depth + 1)),
            ),
            FuzzFilter::Not(filter) => !filter.to_filter(depth + 1),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);

    if let Ok(fuzz_filter) = FuzzFilter::arbitrary(&mut unstructured) {
        let filter = fuzz_filter.to_filter(0);

        // Nothing is the identity of both combinators.
        assert_eq!(Filter::Nothing & filter.clone(), filter);
        assert_eq!(filter.clone() | Filter::Nothing, filter);

        // These operations should never panic
        let doc = filter.to_document();
        let _ = Filter::from_document(&doc);
        let _ = format!("{}", filter);
    }
});
