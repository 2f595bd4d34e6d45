//! Document inspection helpers used by the parser and the comparator.

use bson::{Bson, Document};

use crate::error::FilterResult;

/// Extension trait for BSON documents.
pub trait DocumentExt {
    /// Get the first key/value pair in document order.
    fn first_pair(&self) -> Option<(&str, &Bson)>;

    /// Get the only key/value pair, if the document has exactly one.
    fn single_pair(&self) -> Option<(&str, &Bson)>;

    /// Check whether the keys are exactly `"0"`, `"1"`, ..., `"n-1"` in order.
    fn is_list_shaped(&self) -> bool;

    /// Collect the values in document order if the document is list-shaped.
    fn as_list(&self) -> Option<Vec<&Bson>>;
}

impl DocumentExt for Document {
    fn first_pair(&self) -> Option<(&str, &Bson)> {
        self.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    fn single_pair(&self) -> Option<(&str, &Bson)> {
        if self.len() == 1 {
            self.first_pair()
        } else {
            None
        }
    }

    fn is_list_shaped(&self) -> bool {
        self.keys()
            .enumerate()
            .all(|(index, key)| *key == index.to_string())
    }

    fn as_list(&self) -> Option<Vec<&Bson>> {
        if self.is_list_shaped() {
            Some(self.values().collect())
        } else {
            None
        }
    }
}

/// View a value as a list: a BSON array, or a list-shaped embedded document.
pub fn list_items(value: &Bson) -> Option<Vec<&Bson>> {
    match value {
        Bson::Array(items) => Some(items.iter().collect()),
        Bson::Document(doc) => doc.as_list(),
        _ => None,
    }
}

/// View a value as a list of documents, failing if any element is not one.
pub fn document_items(value: &Bson) -> Option<Vec<&Document>> {
    list_items(value)?
        .into_iter()
        .map(Bson::as_document)
        .collect()
}

/// View a value as a single-operator document such as `{"$gt": 5}`.
pub fn single_operator(value: &Bson) -> Option<(&str, &Bson)> {
    value.as_document().and_then(DocumentExt::single_pair)
}

/// Encode one value as a BSON element without its key: the type byte
/// followed by the element body.
pub fn encode_element(value: &Bson) -> FilterResult<Vec<u8>> {
    let mut wrapper = Document::new();
    wrapper.insert("", value.clone());

    let mut buf = Vec::new();
    wrapper.to_writer(&mut buf)?;

    // [len: i32][type: u8][key: "\0"][body ...][0x00]
    let element_type = buf.get(4).copied().unwrap_or_default();
    let body = buf.get(6..buf.len().saturating_sub(1)).unwrap_or_default();

    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(element_type);
    out.extend_from_slice(body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_first_and_single_pair() {
        let doc = doc! { "a": 1, "b": 2 };
        assert_eq!(doc.first_pair(), Some(("a", &Bson::Int32(1))));
        assert!(doc.single_pair().is_none());

        let doc = doc! { "$gt": 5 };
        assert_eq!(doc.single_pair(), Some(("$gt", &Bson::Int32(5))));

        assert!(Document::new().first_pair().is_none());
    }

    #[test]
    fn test_list_shaped_documents() {
        let list = doc! { "0": "a", "1": "b" };
        assert!(list.is_list_shaped());
        assert_eq!(list.as_list().unwrap().len(), 2);

        let out_of_order = doc! { "1": "a", "0": "b" };
        assert!(!out_of_order.is_list_shaped());

        let named = doc! { "name": "x" };
        assert!(named.as_list().is_none());

        assert!(Document::new().is_list_shaped());
    }

    #[test]
    fn test_list_items() {
        let array = Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)]);
        assert_eq!(list_items(&array).unwrap().len(), 2);

        let list_doc = Bson::Document(doc! { "0": 1 });
        assert_eq!(list_items(&list_doc).unwrap(), vec![&Bson::Int32(1)]);

        assert!(list_items(&Bson::Int32(1)).is_none());
    }

    #[test]
    fn test_document_items_rejects_scalars() {
        let docs = Bson::Array(vec![Bson::Document(doc! { "a": 1 })]);
        assert_eq!(document_items(&docs).unwrap().len(), 1);

        let mixed = Bson::Array(vec![Bson::Document(doc! { "a": 1 }), Bson::Int32(2)]);
        assert!(document_items(&mixed).is_none());
    }

    #[test]
    fn test_single_operator() {
        let value = Bson::Document(doc! { "$eq": "x" });
        assert_eq!(single_operator(&value), Some(("$eq", &Bson::String("x".into()))));
        assert!(single_operator(&Bson::String("x".into())).is_none());
    }

    #[test]
    fn test_encode_element_int32() {
        let bytes = encode_element(&Bson::Int32(1)).unwrap();
        assert_eq!(bytes, vec![0x10, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_element_distinguishes_types() {
        let int = encode_element(&Bson::Int32(1)).unwrap();
        let long = encode_element(&Bson::Int64(1)).unwrap();
        assert_ne!(int, long);
        assert_eq!(long[0], 0x12);
    }
}
