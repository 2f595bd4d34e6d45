//! # quarry-filter
//!
//! Typed filter algebra for MongoDB-style document stores.
//!
//! This crate provides:
//! - A predicate tree ([`Filter`]) covering comparisons, `$in`, `$exists`,
//!   `$type`, `$elemMatch`, regex matching, geospatial operators and literal
//!   passthrough documents
//! - Compilation of that tree to a BSON filter document
//! - Total, best-effort parsing of filter documents back into the tree
//! - Combinators with identity and flattening rules (`&`, `|`, `!`)
//! - A byte-wise total order over canonically encoded BSON values
//!
//! ## Example
//!
//! ```rust
//! use quarry_filter::{Query, field};
//! use bson::doc;
//!
//! let adults = Query::from(field("age").gte(18)) & field("status").eq("active");
//!
//! assert_eq!(
//!     adults.to_filter_document(),
//!     doc! {
//!         "$and": [
//!             { "age": { "$gte": 18 } },
//!             { "status": { "$eq": "active" } },
//!         ]
//!     }
//! );
//! ```
//!
//! ## Parsing
//!
//! Unknown shapes survive as literal documents:
//!
//! ```rust
//! use quarry_filter::Filter;
//! use bson::doc;
//!
//! let doc = doc! { "tags": { "$size": 3 } };
//! assert_eq!(Filter::from_document(&doc), Filter::Raw(doc.clone()));
//! ```

pub mod combine;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod geo;
pub mod logging;
pub mod ordering;
pub mod parse;
pub mod query;
pub mod types;

pub use bson::{Bson, Document, doc};
pub use config::{MultiKeyStrategy, ParseConfig, ParseConfigBuilder};
pub use error::{FilterError, FilterResult};
pub use filter::Filter;
pub use geo::{GeoOperator, Geometry, Point, Polygon};
pub use ordering::CanonicalBytes;
pub use query::{Field, Query, TextSearch, field};
pub use types::BsonType;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{MultiKeyStrategy, ParseConfig};
    pub use crate::document::DocumentExt;
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::filter::Filter;
    pub use crate::geo::{Geometry, Point, Polygon};
    pub use crate::ordering::CanonicalBytes;
    pub use crate::query::{Field, Query, TextSearch, field};
    pub use crate::types::BsonType;
    pub use bson::oid::ObjectId;
    pub use bson::{Bson, Document, doc};
}
