//! Best-effort reconstruction of a predicate tree from a filter document.
//!
//! Parsing never fails. Shapes the parser does not recognize are kept as
//! [`Filter::Raw`] nodes holding the offending key/value pair, so an unknown
//! filter always compiles back to the same literal document.

use bson::{Bson, Document};
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::config::{MultiKeyStrategy, ParseConfig};
use crate::document::{DocumentExt, document_items, list_items, single_operator};
use crate::filter::Filter;

impl Filter {
    /// Parse a filter document with the default configuration.
    ///
    /// ```rust
    /// use bson::doc;
    /// use quarry_filter::Filter;
    ///
    /// let filter = Filter::from_document(&doc! { "age": { "$gt": 21 } });
    /// assert_eq!(filter, Filter::Gt("age".into(), 21.into()));
    /// ```
    pub fn from_document(doc: &Document) -> Self {
        Self::from_document_with(doc, &ParseConfig::default())
    }

    /// Parse a filter document with an explicit configuration.
    pub fn from_document_with(doc: &Document, config: &ParseConfig) -> Self {
        Parser { config }.document(doc, 0)
    }
}

struct Parser<'a> {
    config: &'a ParseConfig,
}

impl Parser<'_> {
    fn document(&self, doc: &Document, depth: usize) -> Filter {
        if doc.len() > 1 {
            return match self.config.multi_key {
                MultiKeyStrategy::Passthrough => {
                    trace!(keys = doc.len(), "multi-key document kept as raw filter");
                    Filter::Raw(doc.clone())
                }
                // Pairs sit one level down, inside the `$and` they compile to.
                MultiKeyStrategy::Conjunction => Filter::And(
                    doc.iter()
                        .map(|(key, value)| self.pair(key, value, depth + 1))
                        .collect(),
                ),
            };
        }

        match doc.first_pair() {
            Some((key, value)) => self.pair(key, value, depth),
            None => Filter::Nothing,
        }
    }

    fn pair(&self, key: &str, value: &Bson, depth: usize) -> Filter {
        if depth >= self.config.max_depth {
            debug!(key, depth, "filter nesting exceeds max depth, keeping raw pair");
            return raw_pair(key, value);
        }

        if let Some(filter) = self.logical(key, value, depth) {
            return filter;
        }

        if let Some(filter) = self.operator(key, value, depth) {
            return filter;
        }

        trace!(key, "unrecognized filter shape, keeping raw pair");
        raw_pair(key, value)
    }

    /// `$or` / `$and` over a list of documents.
    fn logical(&self, key: &str, value: &Bson, depth: usize) -> Option<Filter> {
        let wrap: fn(Vec<Filter>) -> Filter = match key {
            "$or" => Filter::Or,
            "$and" => Filter::And,
            _ => return None,
        };

        let children = document_items(value)?
            .into_iter()
            .map(|doc| self.document(doc, depth + 1))
            .collect();
        Some(wrap(children))
    }

    /// `{key: {"$op": operand}}` shapes.
    fn operator(&self, key: &str, value: &Bson, depth: usize) -> Option<Filter> {
        let (op, operand) = single_operator(value)?;
        let key = SmolStr::new(key);

        let filter = match op {
            "$eq" => Filter::Equals(key, operand.clone()),
            // `$neq` is the legacy spelling; both read back as NotEquals.
            "$neq" | "$ne" => Filter::NotEquals(key, operand.clone()),
            "$gt" => Filter::Gt(key, operand.clone()),
            "$gte" => Filter::Gte(key, operand.clone()),
            "$lt" => Filter::Lt(key, operand.clone()),
            "$lte" => Filter::Lte(key, operand.clone()),
            "$in" => Filter::In(key, list_items(operand)?.into_iter().cloned().collect()),
            "$elemMatch" => {
                let nested = operand.as_document()?;
                Filter::ElemMatch(key, Box::new(self.document(nested, depth + 1)))
            }
            _ => return None,
        };
        Some(filter)
    }
}

fn raw_pair(key: &str, value: &Bson) -> Filter {
    let mut doc = Document::new();
    doc.insert(key, value.clone());
    Filter::Raw(doc)
}
