//! Integration tests for the filter algebra.
//!
//! These tests exercise the public surface end to end:
//! - Building queries with field shorthands and operators
//! - Compiling to filter documents
//! - Parsing filter documents back
//! - Identity and flattening rules of the combinators

use pretty_assertions::assert_eq;
use quarry::prelude::*;

fn sample_filters() -> Vec<Filter> {
    vec![
        field("age").gt(21),
        field("name").eq("alice"),
        field("age").gt(21) & field("age").lt(65),
        field("status").eq("a") | field("status").eq("b"),
        !field("deleted").eq(true),
        field("tags").is_in(["rust", "bson"]),
        field("email").exists(true),
        Filter::raw(doc! { "score": { "$size": 3 } }),
    ]
}

#[test]
fn test_nothing_is_identity_for_and_and_or() {
    for p in sample_filters() {
        assert_eq!(Filter::Nothing & p.clone(), p);
        assert_eq!(p.clone() & Filter::Nothing, p);
        assert_eq!(Filter::Nothing | p.clone(), p);
        assert_eq!(p.clone() | Filter::Nothing, p);
    }
}

#[test]
fn test_and_chain_flattens() {
    let a = field("a").eq(1);
    let b = field("b").eq(2);
    let c = field("c").eq(3);
    let d = field("d").eq(4);

    let left = a.clone() & b.clone();
    let right = c.clone() & d.clone();

    assert_eq!(left & right, Filter::And(vec![a, b, c, d]));
}

#[test]
fn test_not_of_nothing_is_nothing() {
    assert_eq!(!Filter::Nothing, Filter::Nothing);
    assert_eq!(!!Filter::Nothing, Filter::Nothing);
    assert!(Query::all().not().is_all());
}

#[test]
fn test_compile_examples() {
    assert_eq!(
        field("age").gt(21).to_document(),
        doc! { "age": { "$gt": 21 } }
    );
    assert_eq!(
        (field("age").gt(21) & field("age").lt(65)).to_document(),
        doc! { "$and": [{ "age": { "$gt": 21 } }, { "age": { "$lt": 65 } }] }
    );
    assert_eq!(
        (!field("age").eq(21)).to_document(),
        doc! { "age": { "$not": { "$eq": 21 } } }
    );
    assert_eq!(Filter::Nothing.to_document(), doc! {});
}

#[test]
fn test_type_is_number_expands_to_or() {
    assert_eq!(
        field("n").type_is(BsonType::Number).to_document(),
        doc! {
            "$or": [
                { "n": { "$type": 1 } },
                { "n": { "$type": 16 } },
                { "n": { "$type": 18 } },
            ]
        }
    );
    assert_eq!(
        field("s").type_is(BsonType::String).to_document(),
        doc! { "s": { "$type": 2 } }
    );
}

#[test]
fn test_parse_or_of_plain_pairs_is_raw_children() {
    let filter = Filter::from_document(&doc! { "$or": [{ "a": 1 }, { "b": 2 }] });
    assert_eq!(
        filter,
        Filter::Or(vec![
            Filter::raw(doc! { "a": 1 }),
            Filter::raw(doc! { "b": 2 }),
        ])
    );
}

#[test]
fn test_parse_round_trips_recognized_shapes() {
    let query = Query::from(field("age").gte(18))
        & (field("role").eq("admin") | field("role").ne("guest"))
        & field("tags").is_in(["a", "b"])
        & field("results").elem_match(field("score").gt(80));

    let doc = query.to_filter_document();
    assert_eq!(Query::from_filter_document(&doc), query);
    assert_eq!(Query::from_filter_document(&doc).to_filter_document(), doc);
}

#[test]
fn test_parse_is_total_for_unknown_shapes() {
    for doc in [
        doc! { "a": { "$regex": "^x" } },
        doc! { "$where": "this.a > 1" },
        doc! { "loc": { "$near": { "$geometry": { "type": "Point", "coordinates": [0.0, 0.0] } } } },
        doc! { "$or": "not a list" },
    ] {
        let filter = Filter::from_document(&doc);
        assert_eq!(filter.to_document(), doc);
    }
}

#[test]
fn test_multi_key_document_strategies() {
    let doc = doc! { "a": { "$eq": 1 }, "b": { "$lt": 2 } };

    assert_eq!(Query::from_filter_document(&doc), Query::raw(doc.clone()));

    let config = ParseConfig::builder()
        .multi_key(MultiKeyStrategy::Conjunction)
        .build()
        .unwrap();
    assert_eq!(
        Query::from_filter_document_with(&doc, &config).into_filter(),
        field("a").eq(1) & field("b").lt(2)
    );
}

#[test]
fn test_legacy_not_equals_spelling() {
    let filter = Filter::from_document(&doc! { "a": { "$neq": 5 } });
    assert_eq!(filter, field("a").ne(5));
    assert_eq!(filter.to_document(), doc! { "a": { "$ne": 5 } });
}

#[test]
fn test_query_shorthands() {
    assert_eq!(Query::eq("x", None).into_filter(), field("x").exists(false));
    assert_eq!(Query::ne("x", None).into_filter(), field("x").exists(true));
    assert_eq!(
        Query::eq("x", Some(Bson::Int32(1))).to_filter_document(),
        doc! { "x": { "$eq": 1 } }
    );

    let oid = ObjectId::new();
    assert_eq!(
        Query::by_id_str(&oid.to_hex()).unwrap(),
        Query::by_id(oid)
    );
    assert!(Query::by_id_str("not-an-id").is_err());
}

#[test]
fn test_text_search() {
    let query = Query::from(TextSearch::new("coffee").language("en").case_sensitive(true));
    assert_eq!(
        query.to_filter_document(),
        doc! {
            "$text": {
                "$search": "coffee",
                "$language": "en",
                "$caseSensitive": true,
            }
        }
    );
}

#[test]
fn test_regex_shorthands() {
    let filter = field("name").starts_with_options("al", "i");
    let doc = filter.to_document();
    match doc.get("name") {
        Some(Bson::RegularExpression(regex)) => {
            assert_eq!(regex.pattern, "^al");
            assert_eq!(regex.options, "im");
        }
        other => panic!("expected regex, got {:?}", other),
    }
}

#[test]
fn test_geo_within_and_intersects() {
    let square = Polygon::new(vec![
        Point::new(0.0, 0.0).unwrap(),
        Point::new(1.0, 0.0).unwrap(),
        Point::new(1.0, 1.0).unwrap(),
        Point::new(0.0, 0.0).unwrap(),
    ])
    .unwrap();

    let doc = field("loc").geo_within(square.clone()).to_document();
    let body = doc
        .get_document("loc")
        .and_then(|d| d.get_document("$geoWithin"))
        .and_then(|d| d.get_document("$geometry"))
        .unwrap();
    assert_eq!(body.get_str("type").unwrap(), "Polygon");

    let line = Geometry::line_string(vec![
        Point::new(0.0, 0.0).unwrap(),
        Point::new(2.0, 2.0).unwrap(),
    ])
    .unwrap();
    assert_eq!(
        field("route").geo_intersects(line.clone()),
        field("route").geo_intersects(line)
    );

    assert!(Point::new(181.0, 0.0).is_err());
}

#[test]
fn test_structural_equality_of_raw_documents() {
    let a = Filter::raw(doc! { "x": 1, "y": 2 });
    let b = Filter::raw(doc! { "y": 2, "x": 1 });
    assert_eq!(a, b);
    assert_ne!(a, Filter::raw(doc! { "x": 1, "y": 3 }));
    assert_ne!(field("x").eq(1), field("x").eq(1i64));
}

#[test]
fn test_query_serde_uses_filter_document() {
    let query = Query::from(field("age").gt(21));
    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json, serde_json::json!({ "age": { "$gt": 21 } }));

    let bson = bson::to_bson(&query).unwrap();
    let back: Query = bson::from_bson(bson).unwrap();
    assert_eq!(back, query);
}
