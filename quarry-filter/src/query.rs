//! The user-facing query handle and its construction shorthands.
//!
//! ```rust
//! use bson::doc;
//! use quarry_filter::{Query, field};
//!
//! let age = field("age");
//! let query = Query::from(age.gt(21) & age.lt(65));
//!
//! assert_eq!(
//!     query.to_filter_document(),
//!     doc! { "$and": [{ "age": { "$gt": 21 } }, { "age": { "$lt": 65 } }] }
//! );
//! ```

use std::fmt;
use std::mem;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use bson::oid::ObjectId;
use bson::{Bson, Document};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;

use crate::config::ParseConfig;
use crate::error::FilterResult;
use crate::filter::Filter;
use crate::geo::{Geometry, Point, Polygon};
use crate::types::BsonType;

/// A filter query wrapping one predicate tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    root: Filter,
}

impl Query {
    /// Wrap a predicate tree.
    pub fn new(root: Filter) -> Self {
        Self { root }
    }

    /// A query matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// A query passing a literal filter document through unchanged.
    pub fn raw(doc: Document) -> Self {
        Self::new(Filter::raw(doc))
    }

    /// A `$text` search with default options.
    pub fn text(search: impl Into<String>) -> Self {
        TextSearch::new(search).into()
    }

    /// Equality shorthand; `None` means the key must not exist.
    pub fn eq(key: impl Into<SmolStr>, value: Option<Bson>) -> Self {
        Self::new(Filter::key_eq(key, value))
    }

    /// Inequality shorthand; `None` means the key must exist.
    pub fn ne(key: impl Into<SmolStr>, value: Option<Bson>) -> Self {
        Self::new(Filter::key_ne(key, value))
    }

    /// Match a document by its `_id`.
    pub fn by_id(id: ObjectId) -> Self {
        Self::new(Filter::Equals("_id".into(), Bson::ObjectId(id)))
    }

    /// Match a document by its `_id` given as a hex string.
    pub fn by_id_str(id: &str) -> FilterResult<Self> {
        let oid = ObjectId::parse_str(id)?;
        Ok(Self::by_id(oid))
    }

    /// Parse a filter document.
    pub fn from_filter_document(doc: &Document) -> Self {
        Self::new(Filter::from_document(doc))
    }

    /// Parse a filter document with an explicit configuration.
    pub fn from_filter_document_with(doc: &Document, config: &ParseConfig) -> Self {
        Self::new(Filter::from_document_with(doc, config))
    }

    /// Compile to the filter document sent to the server.
    pub fn to_filter_document(&self) -> Document {
        self.root.to_document()
    }

    /// The root of the predicate tree.
    pub fn filter(&self) -> &Filter {
        &self.root
    }

    /// Consume into the root of the predicate tree.
    pub fn into_filter(self) -> Filter {
        self.root
    }

    /// Check if this query matches every document.
    pub fn is_all(&self) -> bool {
        self.root.is_nothing()
    }

    /// Combine with another query or filter using AND.
    pub fn and(self, other: impl Into<Filter>) -> Self {
        Self::new(self.root.and(other.into()))
    }

    /// Combine with another query or filter using OR.
    pub fn or(self, other: impl Into<Filter>) -> Self {
        Self::new(self.root.or(other.into()))
    }

    /// Negate this query.
    pub fn not(self) -> Self {
        Self::new(self.root.not())
    }
}

impl From<Filter> for Query {
    fn from(root: Filter) -> Self {
        Self::new(root)
    }
}

impl From<Query> for Filter {
    fn from(query: Query) -> Self {
        query.root
    }
}

impl From<Document> for Query {
    fn from(doc: Document) -> Self {
        Self::from_filter_document(&doc)
    }
}

impl From<&str> for Query {
    fn from(search: &str) -> Self {
        Self::text(search)
    }
}

impl From<String> for Query {
    fn from(search: String) -> Self {
        Self::text(search)
    }
}

impl<F: Into<Filter>> BitAnd<F> for Query {
    type Output = Query;

    fn bitand(self, rhs: F) -> Query {
        self.and(rhs)
    }
}

impl<F: Into<Filter>> BitOr<F> for Query {
    type Output = Query;

    fn bitor(self, rhs: F) -> Query {
        self.or(rhs)
    }
}

impl Not for Query {
    type Output = Query;

    fn not(self) -> Query {
        Query::not(self)
    }
}

impl<F: Into<Filter>> BitAndAssign<F> for Query {
    fn bitand_assign(&mut self, rhs: F) {
        *self = mem::take(self).and(rhs);
    }
}

impl<F: Into<Filter>> BitOrAssign<F> for Query {
    fn bitor_assign(&mut self, rhs: F) {
        *self = mem::take(self).or(rhs);
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_filter_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = Document::deserialize(deserializer)?;
        Ok(Self::from_filter_document(&doc))
    }
}

/// Start a filter on a field path.
pub fn field(key: impl Into<SmolStr>) -> Field {
    Field::new(key)
}

/// A field path with shorthands for building leaf filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    key: SmolStr,
}

impl Field {
    /// Create a field handle.
    pub fn new(key: impl Into<SmolStr>) -> Self {
        Self { key: key.into() }
    }

    /// The field path.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `field == value`
    pub fn eq(&self, value: impl Into<Bson>) -> Filter {
        Filter::Equals(self.key.clone(), value.into())
    }

    /// `field != value`
    pub fn ne(&self, value: impl Into<Bson>) -> Filter {
        Filter::NotEquals(self.key.clone(), value.into())
    }

    /// Equality over an optional value; `None` means the key must not exist.
    pub fn eq_opt<V: Into<Bson>>(&self, value: Option<V>) -> Filter {
        Filter::key_eq(self.key.clone(), value.map(Into::into))
    }

    /// Inequality over an optional value; `None` means the key must exist.
    pub fn ne_opt<V: Into<Bson>>(&self, value: Option<V>) -> Filter {
        Filter::key_ne(self.key.clone(), value.map(Into::into))
    }

    /// `field > value`
    pub fn gt(&self, value: impl Into<Bson>) -> Filter {
        Filter::Gt(self.key.clone(), value.into())
    }

    /// `field >= value`
    pub fn gte(&self, value: impl Into<Bson>) -> Filter {
        Filter::Gte(self.key.clone(), value.into())
    }

    /// `field < value`
    pub fn lt(&self, value: impl Into<Bson>) -> Filter {
        Filter::Lt(self.key.clone(), value.into())
    }

    /// `field <= value`
    pub fn lte(&self, value: impl Into<Bson>) -> Filter {
        Filter::Lte(self.key.clone(), value.into())
    }

    /// Value is one of `values`.
    pub fn is_in<V: Into<Bson>>(&self, values: impl IntoIterator<Item = V>) -> Filter {
        Filter::In(self.key.clone(), values.into_iter().map(Into::into).collect())
    }

    /// Key presence.
    pub fn exists(&self, exists: bool) -> Filter {
        Filter::Exists(self.key.clone(), exists)
    }

    /// `$type` check.
    pub fn type_is(&self, ty: BsonType) -> Filter {
        Filter::TypeIs(self.key.clone(), ty)
    }

    /// Some array element matches `filter`.
    pub fn elem_match(&self, filter: Filter) -> Filter {
        Filter::ElemMatch(self.key.clone(), Box::new(filter))
    }

    /// Unanchored regex match.
    pub fn contains(&self, pattern: impl Into<SmolStr>) -> Filter {
        self.contains_with_options(pattern, "")
    }

    /// Unanchored regex match with option flags.
    pub fn contains_with_options(
        &self,
        pattern: impl Into<SmolStr>,
        options: impl Into<SmolStr>,
    ) -> Filter {
        Filter::Contains {
            key: self.key.clone(),
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    /// Regex anchored at the start of a line.
    pub fn starts_with(&self, pattern: impl Into<SmolStr>) -> Filter {
        self.starts_with_options(pattern, "")
    }

    /// Regex anchored at the start of a line, with option flags.
    pub fn starts_with_options(
        &self,
        pattern: impl Into<SmolStr>,
        options: impl Into<SmolStr>,
    ) -> Filter {
        Filter::StartsWith {
            key: self.key.clone(),
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    /// Regex anchored at the end of a line.
    pub fn ends_with(&self, pattern: impl Into<SmolStr>) -> Filter {
        self.ends_with_options(pattern, "")
    }

    /// Regex anchored at the end of a line, with option flags.
    pub fn ends_with_options(
        &self,
        pattern: impl Into<SmolStr>,
        options: impl Into<SmolStr>,
    ) -> Filter {
        Filter::EndsWith {
            key: self.key.clone(),
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    /// `$near` a point.
    pub fn near(&self, point: Point, max_distance: Option<f64>, min_distance: Option<f64>) -> Filter {
        Filter::Near {
            key: self.key.clone(),
            point,
            max_distance,
            min_distance,
        }
    }

    /// `$nearSphere` a point.
    pub fn near_sphere(
        &self,
        point: Point,
        max_distance: Option<f64>,
        min_distance: Option<f64>,
    ) -> Filter {
        Filter::NearSphere {
            key: self.key.clone(),
            point,
            max_distance,
            min_distance,
        }
    }

    /// `$geoWithin` a polygon.
    pub fn geo_within(&self, polygon: Polygon) -> Filter {
        Filter::GeoWithin {
            key: self.key.clone(),
            polygon,
        }
    }

    /// `$geoIntersects` a geometry.
    pub fn geo_intersects(&self, geometry: impl Into<Geometry>) -> Filter {
        Filter::GeoIntersects {
            key: self.key.clone(),
            geometry: geometry.into(),
        }
    }
}

/// Builder for a `$text` search clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    search: String,
    language: Option<String>,
    case_sensitive: Option<bool>,
    diacritic_sensitive: Option<bool>,
}

impl TextSearch {
    /// Search for the given terms.
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            language: None,
            case_sensitive: None,
            diacritic_sensitive: None,
        }
    }

    /// Set the stemming language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Enable or disable case sensitivity.
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = Some(enabled);
        self
    }

    /// Enable or disable diacritic sensitivity.
    pub fn diacritic_sensitive(mut self, enabled: bool) -> Self {
        self.diacritic_sensitive = Some(enabled);
        self
    }

    /// Build the `{"$text": {...}}` document.
    pub fn to_document(&self) -> Document {
        let mut text = Document::new();
        text.insert("$search", self.search.as_str());
        if let Some(language) = &self.language {
            text.insert("$language", language.as_str());
        }
        if let Some(case_sensitive) = self.case_sensitive {
            text.insert("$caseSensitive", case_sensitive);
        }
        if let Some(diacritic_sensitive) = self.diacritic_sensitive {
            text.insert("$diacriticSensitive", diacritic_sensitive);
        }

        let mut out = Document::new();
        out.insert("$text", text);
        out
    }
}

impl From<TextSearch> for Filter {
    fn from(search: TextSearch) -> Self {
        Filter::raw(search.to_document())
    }
}

impl From<TextSearch> for Query {
    fn from(search: TextSearch) -> Self {
        Query::new(search.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Regex, doc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_matches_everything() {
        let query = Query::all();
        assert!(query.is_all());
        assert!(query.to_filter_document().is_empty());
        assert_eq!(query, Query::default());
    }

    #[test]
    fn test_field_comparisons() {
        assert_eq!(
            field("age").gt(21).to_document(),
            doc! { "age": { "$gt": 21 } }
        );
        assert_eq!(
            field("age").lte(65).to_document(),
            doc! { "age": { "$lte": 65 } }
        );
        assert_eq!(
            field("name").ne("bob").to_document(),
            doc! { "name": { "$ne": "bob" } }
        );
    }

    #[test]
    fn test_field_optional_equality() {
        assert_eq!(field("x").eq_opt(Some(1)), field("x").eq(1));
        assert_eq!(field("x").eq_opt(None::<i32>), field("x").exists(false));
        assert_eq!(field("x").ne_opt(Some(1)), field("x").ne(1));
        assert_eq!(field("x").ne_opt(None::<i32>), field("x").exists(true));
    }

    #[test]
    fn test_query_key_shorthands() {
        assert_eq!(
            Query::eq("x", Some(Bson::Int32(1))).filter(),
            &Filter::Equals("x".into(), 1.into())
        );
        assert_eq!(
            Query::eq("x", None).to_filter_document(),
            doc! { "x": { "$exists": false } }
        );
        assert_eq!(
            Query::ne("x", None).to_filter_document(),
            doc! { "x": { "$exists": true } }
        );
    }

    #[test]
    fn test_is_in_and_type() {
        assert_eq!(
            field("tag").is_in(["a", "b"]).to_document(),
            doc! { "tag": { "$in": ["a", "b"] } }
        );
        assert_eq!(
            field("n").type_is(BsonType::Int64).to_document(),
            doc! { "n": { "$type": 18 } }
        );
    }

    #[test]
    fn test_regex_shorthands() {
        let regex = |pattern: &str, options: &str| Regex {
            pattern: pattern.to_string(),
            options: options.to_string(),
        };

        let filter = field("email").contains_with_options("example", "i");
        assert_eq!(
            filter.to_document(),
            doc! { "email": regex("example", "i") }
        );

        let filter = field("name").starts_with("Al");
        assert_eq!(filter.to_document(), doc! { "name": regex("^Al", "m") });

        let filter = field("name").ends_with_options("son", "i");
        assert_eq!(filter.to_document(), doc! { "name": regex("son$", "im") });
    }

    #[test]
    fn test_text_search() {
        assert_eq!(
            Query::text("coffee shop").to_filter_document(),
            doc! { "$text": { "$search": "coffee shop" } }
        );

        let query: Query = TextSearch::new("café")
            .language("fr")
            .case_sensitive(true)
            .diacritic_sensitive(false)
            .into();
        assert_eq!(
            query.to_filter_document(),
            doc! {
                "$text": {
                    "$search": "café",
                    "$language": "fr",
                    "$caseSensitive": true,
                    "$diacriticSensitive": false
                }
            }
        );
    }

    #[test]
    fn test_implicit_text_search_from_str() {
        assert_eq!(Query::from("espresso"), Query::text("espresso"));
        assert_eq!(Query::from("espresso".to_string()), Query::text("espresso"));
    }

    #[test]
    fn test_raw_query() {
        let doc = doc! { "$where": "this.a == 1" };
        assert_eq!(Query::raw(doc.clone()).to_filter_document(), doc);
    }

    #[test]
    fn test_by_id() {
        let oid = ObjectId::new();
        let query = Query::by_id(oid);
        assert_eq!(query.to_filter_document(), doc! { "_id": { "$eq": oid } });

        assert_eq!(Query::by_id_str(&oid.to_hex()).unwrap(), query);
        assert!(Query::by_id_str("nope").is_err());
    }

    #[test]
    fn test_query_operators() {
        let mut query = Query::all();
        query &= field("a").eq(1);
        query &= field("b").eq(2);
        assert_eq!(
            query.filter(),
            &Filter::And(vec![field("a").eq(1), field("b").eq(2)])
        );

        let either = Query::from(field("a").eq(1)) | Query::from(field("b").eq(2));
        assert_eq!(either.filter(), &(field("a").eq(1) | field("b").eq(2)));

        assert_eq!(!Query::all(), Query::all());
        assert_eq!(
            (!Query::from(field("a").eq(1))).into_filter(),
            !field("a").eq(1)
        );
    }

    #[test]
    fn test_from_document_parses() {
        let query = Query::from(doc! { "age": { "$gte": 18 } });
        assert_eq!(query.filter(), &field("age").gte(18));
    }

    #[test]
    fn test_serialize_compiles() {
        let query = Query::from(field("age").gt(21));
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({ "age": { "$gt": 21 } }));
    }

    #[test]
    fn test_deserialize_parses() {
        let query: Query = serde_json::from_str(r#"{"age": {"$gt": 21}}"#).unwrap();
        assert!(matches!(query.filter(), Filter::Gt(key, _) if key == "age"));
    }

    #[test]
    fn test_display() {
        let query = Query::from(field("a").exists(true));
        assert_eq!(query.to_string(), query.filter().to_string());
    }
}
