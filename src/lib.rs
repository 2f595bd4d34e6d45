//! # Quarry
//!
//! Composable, typed filters for MongoDB-style document stores.
//!
//! Quarry provides:
//! - A predicate tree that compiles to BSON filter documents
//! - A total parser that turns filter documents back into predicate trees
//! - `&`, `|` and `!` combinators with identity and flattening rules
//! - A canonical byte ordering over BSON values
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! let query = Query::from(field("age").gt(21)) & field("status").is_in(["active", "trial"]);
//!
//! assert_eq!(
//!     query.to_filter_document(),
//!     doc! {
//!         "$and": [
//!             { "age": { "$gt": 21 } },
//!             { "status": { "$in": ["active", "trial"] } },
//!         ]
//!     }
//! );
//!
//! let parsed = Query::from_filter_document(&query.to_filter_document());
//! assert_eq!(parsed, query);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Predicate tree, parser and combinators.
pub mod filter {
    pub use quarry_filter::*;
}

/// Canonical BSON byte ordering.
pub mod ordering {
    pub use quarry_filter::ordering::*;
}

/// Geospatial shapes and operators.
pub mod geo {
    pub use quarry_filter::geo::*;
}

/// Logging setup.
pub mod logging {
    pub use quarry_filter::logging::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quarry_filter::prelude::*;
}

// Re-export key types at the crate root
pub use quarry_filter::{
    BsonType, CanonicalBytes, Field, Filter, FilterError, FilterResult, MultiKeyStrategy,
    ParseConfig, Query, TextSearch, field,
};
