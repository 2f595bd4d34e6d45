//! The predicate tree and its compiler to filter documents.
//!
//! A [`Filter`] is an immutable tree. Leaves test one key; `And`, `Or`, `Not`
//! and `ElemMatch` own their children. Every variant compiles to a BSON filter
//! document, so [`Filter::to_document`] is total.
//!
//! ```rust
//! use bson::doc;
//! use quarry_filter::Filter;
//!
//! let filter = Filter::Gt("age".into(), 21.into());
//! assert_eq!(filter.to_document(), doc! { "age": { "$gt": 21 } });
//! ```

use std::fmt;

use bson::{Bson, Document, Regex, doc};
use smol_str::SmolStr;
use tracing::trace;

use crate::geo::{self, GeoOperator, Geometry, Point, Polygon};
use crate::ordering::values_equal;
use crate::types::BsonType;

/// A node of the predicate tree.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    /// No condition; matches every document.
    #[default]
    Nothing,

    /// `$type` check.
    TypeIs(SmolStr, BsonType),

    /// Equals comparison.
    Equals(SmolStr, Bson),
    /// Not equals comparison.
    NotEquals(SmolStr, Bson),

    /// Greater than comparison.
    Gt(SmolStr, Bson),
    /// Greater than or equal comparison.
    Gte(SmolStr, Bson),
    /// Less than comparison.
    Lt(SmolStr, Bson),
    /// Less than or equal comparison.
    Lte(SmolStr, Bson),

    /// At least one array element matches the nested filter.
    ElemMatch(SmolStr, Box<Filter>),

    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
    /// Logical NOT of a filter.
    Not(Box<Filter>),

    /// Unanchored regular expression match.
    Contains {
        /// Field path.
        key: SmolStr,
        /// Regular expression pattern.
        pattern: SmolStr,
        /// Regex option flags.
        options: SmolStr,
    },
    /// Regular expression anchored at the start of a line.
    StartsWith {
        /// Field path.
        key: SmolStr,
        /// Regular expression pattern.
        pattern: SmolStr,
        /// Regex option flags.
        options: SmolStr,
    },
    /// Regular expression anchored at the end of a line.
    EndsWith {
        /// Field path.
        key: SmolStr,
        /// Regular expression pattern.
        pattern: SmolStr,
        /// Regex option flags.
        options: SmolStr,
    },

    /// A literal filter document, passed through unchanged.
    Raw(Document),

    /// `$exists` check.
    Exists(SmolStr, bool),

    /// Value is one of the listed values.
    In(SmolStr, Vec<Bson>),

    /// `$near` a point.
    Near {
        /// Field path.
        key: SmolStr,
        /// Center point.
        point: Point,
        /// Maximum distance in meters.
        max_distance: Option<f64>,
        /// Minimum distance in meters.
        min_distance: Option<f64>,
    },
    /// `$nearSphere` a point.
    NearSphere {
        /// Field path.
        key: SmolStr,
        /// Center point.
        point: Point,
        /// Maximum distance in meters.
        max_distance: Option<f64>,
        /// Minimum distance in meters.
        min_distance: Option<f64>,
    },
    /// `$geoWithin` a polygon.
    GeoWithin {
        /// Field path.
        key: SmolStr,
        /// Bounding polygon.
        polygon: Polygon,
    },
    /// `$geoIntersects` a geometry.
    GeoIntersects {
        /// Field path.
        key: SmolStr,
        /// Intersecting geometry.
        geometry: Geometry,
    },
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn nothing() -> Self {
        Self::Nothing
    }

    /// Wrap a literal filter document.
    pub fn raw(doc: Document) -> Self {
        Self::Raw(doc)
    }

    /// Check if this filter is empty.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// The field path a leaf filter tests, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::TypeIs(key, _)
            | Self::Equals(key, _)
            | Self::NotEquals(key, _)
            | Self::Gt(key, _)
            | Self::Gte(key, _)
            | Self::Lt(key, _)
            | Self::Lte(key, _)
            | Self::ElemMatch(key, _)
            | Self::Exists(key, _)
            | Self::In(key, _)
            | Self::Contains { key, .. }
            | Self::StartsWith { key, .. }
            | Self::EndsWith { key, .. }
            | Self::Near { key, .. }
            | Self::NearSphere { key, .. }
            | Self::GeoWithin { key, .. }
            | Self::GeoIntersects { key, .. } => Some(key.as_str()),
            Self::Nothing | Self::And(_) | Self::Or(_) | Self::Not(_) | Self::Raw(_) => None,
        }
    }

    /// Compile to a filter document.
    pub fn to_document(&self) -> Document {
        let doc = self.compile();
        trace!(keys = doc.len(), "compiled filter document");
        doc
    }

    fn compile(&self) -> Document {
        match self {
            Self::Nothing => Document::new(),

            Self::TypeIs(key, BsonType::Number) => Self::Or(
                BsonType::NUMERIC
                    .iter()
                    .map(|ty| Self::TypeIs(key.clone(), *ty))
                    .collect(),
            )
            .compile(),
            Self::TypeIs(key, ty) => {
                // Only `Number` lacks a code, and it is handled above.
                let code = ty.code().unwrap_or_default();
                clause(key, "$type", Bson::Int32(code))
            }

            Self::Equals(key, value) => clause(key, "$eq", value.clone()),
            Self::NotEquals(key, value) => clause(key, "$ne", value.clone()),
            Self::Gt(key, value) => clause(key, "$gt", value.clone()),
            Self::Gte(key, value) => clause(key, "$gte", value.clone()),
            Self::Lt(key, value) => clause(key, "$lt", value.clone()),
            Self::Lte(key, value) => clause(key, "$lte", value.clone()),

            Self::ElemMatch(key, nested) => clause(key, "$elemMatch", nested.compile().into()),

            Self::And(filters) => doc! { "$and": compile_all(filters) },
            Self::Or(filters) => doc! { "$or": compile_all(filters) },

            Self::Not(inner) => {
                let mut out = Document::new();
                for (key, value) in inner.compile() {
                    out.insert(key, doc! { "$not": value });
                }
                out
            }

            Self::Contains {
                key,
                pattern,
                options,
            } => regex_clause(key, pattern.to_string(), options, false),
            Self::StartsWith {
                key,
                pattern,
                options,
            } => regex_clause(key, format!("^{}", pattern), options, true),
            Self::EndsWith {
                key,
                pattern,
                options,
            } => regex_clause(key, format!("{}$", pattern), options, true),

            Self::Raw(doc) => doc.clone(),

            Self::Exists(key, exists) => clause(key, "$exists", Bson::Boolean(*exists)),

            Self::In(key, values) => clause(key, "$in", Bson::Array(values.clone())),

            Self::Near {
                key,
                point,
                max_distance,
                min_distance,
            } => geo::operator(
                key,
                GeoOperator::Near,
                &Geometry::Point(*point),
                *max_distance,
                *min_distance,
            ),
            Self::NearSphere {
                key,
                point,
                max_distance,
                min_distance,
            } => geo::operator(
                key,
                GeoOperator::NearSphere,
                &Geometry::Point(*point),
                *max_distance,
                *min_distance,
            ),
            Self::GeoWithin { key, polygon } => geo::operator(
                key,
                GeoOperator::GeoWithin,
                &Geometry::Polygon(polygon.clone()),
                None,
                None,
            ),
            Self::GeoIntersects { key, geometry } => {
                geo::operator(key, GeoOperator::GeoIntersects, geometry, None, None)
            }
        }
    }
}

/// `{key: {op: value}}`
fn clause(key: &str, op: &str, value: Bson) -> Document {
    let mut inner = Document::new();
    inner.insert(op, value);

    let mut out = Document::new();
    out.insert(key, inner);
    out
}

fn compile_all(filters: &[Filter]) -> Vec<Bson> {
    filters.iter().map(|f| Bson::Document(f.compile())).collect()
}

fn regex_clause(key: &str, pattern: String, options: &str, anchored: bool) -> Document {
    let regex = Regex {
        pattern,
        options: normalize_options(options, anchored),
    };

    let mut out = Document::new();
    out.insert(key, Bson::RegularExpression(regex));
    out
}

/// Sort and deduplicate regex flags, adding `m` for line-anchored patterns.
pub(crate) fn normalize_options(options: &str, anchored: bool) -> String {
    let mut flags: Vec<char> = options.chars().collect();
    if anchored {
        flags.push('m');
    }
    flags.sort_unstable();
    flags.dedup();
    flags.into_iter().collect()
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nothing, Self::Nothing) => true,

            (Self::TypeIs(k1, t1), Self::TypeIs(k2, t2)) => k1 == k2 && t1 == t2,

            (Self::Equals(k1, v1), Self::Equals(k2, v2))
            | (Self::NotEquals(k1, v1), Self::NotEquals(k2, v2))
            | (Self::Gt(k1, v1), Self::Gt(k2, v2))
            | (Self::Gte(k1, v1), Self::Gte(k2, v2))
            | (Self::Lt(k1, v1), Self::Lt(k2, v2))
            | (Self::Lte(k1, v1), Self::Lte(k2, v2)) => k1 == k2 && values_equal(v1, v2),

            (Self::ElemMatch(k1, f1), Self::ElemMatch(k2, f2)) => k1 == k2 && f1 == f2,

            (Self::And(a), Self::And(b)) | (Self::Or(a), Self::Or(b)) => a == b,
            (Self::Not(a), Self::Not(b)) => a == b,

            (
                Self::Contains {
                    key: k1,
                    pattern: p1,
                    options: o1,
                },
                Self::Contains {
                    key: k2,
                    pattern: p2,
                    options: o2,
                },
            ) => {
                k1 == k2
                    && p1 == p2
                    && normalize_options(o1, false) == normalize_options(o2, false)
            }

            (
                Self::StartsWith {
                    key: k1,
                    pattern: p1,
                    options: o1,
                },
                Self::StartsWith {
                    key: k2,
                    pattern: p2,
                    options: o2,
                },
            )
            | (
                Self::EndsWith {
                    key: k1,
                    pattern: p1,
                    options: o1,
                },
                Self::EndsWith {
                    key: k2,
                    pattern: p2,
                    options: o2,
                },
            ) => {
                k1 == k2
                    && p1 == p2
                    && normalize_options(o1, true) == normalize_options(o2, true)
            }

            (Self::Raw(a), Self::Raw(b)) => raw_equal(a, b),

            (Self::Exists(k1, e1), Self::Exists(k2, e2)) => k1 == k2 && e1 == e2,

            (Self::In(k1, v1), Self::In(k2, v2)) => {
                k1 == k2
                    && v1.len() == v2.len()
                    && v1.iter().zip(v2).all(|(a, b)| values_equal(a, b))
            }

            (
                Self::Near {
                    key: k1,
                    point: p1,
                    max_distance: max1,
                    min_distance: min1,
                },
                Self::Near {
                    key: k2,
                    point: p2,
                    max_distance: max2,
                    min_distance: min2,
                },
            )
            | (
                Self::NearSphere {
                    key: k1,
                    point: p1,
                    max_distance: max1,
                    min_distance: min1,
                },
                Self::NearSphere {
                    key: k2,
                    point: p2,
                    max_distance: max2,
                    min_distance: min2,
                },
            ) => {
                k1 == k2
                    && geometry_equal(&Geometry::Point(*p1), &Geometry::Point(*p2))
                    && bits(*max1) == bits(*max2)
                    && bits(*min1) == bits(*min2)
            }

            (Self::GeoWithin { key: k1, polygon: p1 }, Self::GeoWithin { key: k2, polygon: p2 }) => {
                k1 == k2
                    && values_equal(
                        &Bson::Document(p1.to_document()),
                        &Bson::Document(p2.to_document()),
                    )
            }

            (
                Self::GeoIntersects {
                    key: k1,
                    geometry: g1,
                },
                Self::GeoIntersects {
                    key: k2,
                    geometry: g2,
                },
            ) => k1 == k2 && geometry_equal(g1, g2),

            _ => false,
        }
    }
}

impl Eq for Filter {}

/// Literal documents compare as maps: key order is not significant.
fn raw_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
}

fn geometry_equal(a: &Geometry, b: &Geometry) -> bool {
    values_equal(
        &Bson::Document(a.to_document()),
        &Bson::Document(b.to_document()),
    )
}

fn bits(value: Option<f64>) -> Option<u64> {
    value.map(f64::to_bits)
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compile())
    }
}

impl From<Document> for Filter {
    fn from(doc: Document) -> Self {
        Self::from_document(&doc)
    }
}
