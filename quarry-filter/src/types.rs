//! BSON meta-types used by `$type` checks.

use std::fmt;
use std::str::FromStr;

use bson::Bson;
use bson::spec::ElementType;

/// A `$type` target.
///
/// Every variant except [`BsonType::Number`] mirrors a wire-level type code.
/// `Number` is synthetic: the compiler expands it into a disjunction of
/// `Double`, `Int32` and `Int64` checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BsonType {
    /// 64-bit binary floating point.
    Double,
    /// UTF-8 string.
    String,
    /// Embedded document.
    Document,
    /// Array.
    Array,
    /// Binary data.
    Binary,
    /// 12-byte ObjectId.
    ObjectId,
    /// Boolean.
    Boolean,
    /// UTC datetime.
    DateTime,
    /// Null.
    Null,
    /// Regular expression with options.
    RegularExpression,
    /// JavaScript code.
    JavaScriptCode,
    /// JavaScript code with scope.
    JavaScriptCodeWithScope,
    /// 32-bit integer.
    Int32,
    /// Replication timestamp.
    Timestamp,
    /// 64-bit integer.
    Int64,
    /// 128-bit decimal.
    Decimal128,
    /// Min key sentinel.
    MinKey,
    /// Max key sentinel.
    MaxKey,
    /// Any numeric type (double, int32 or int64).
    Number,
}

impl BsonType {
    /// Concrete types that make up [`BsonType::Number`].
    pub const NUMERIC: [BsonType; 3] = [BsonType::Double, BsonType::Int32, BsonType::Int64];

    /// The `$type` code, or `None` for the synthetic `Number`.
    pub fn code(self) -> Option<i32> {
        let code = match self {
            Self::Double => 1,
            Self::String => 2,
            Self::Document => 3,
            Self::Array => 4,
            Self::Binary => 5,
            Self::ObjectId => 7,
            Self::Boolean => 8,
            Self::DateTime => 9,
            Self::Null => 10,
            Self::RegularExpression => 11,
            Self::JavaScriptCode => 13,
            Self::JavaScriptCodeWithScope => 15,
            Self::Int32 => 16,
            Self::Timestamp => 17,
            Self::Int64 => 18,
            Self::Decimal128 => 19,
            Self::MinKey => -1,
            Self::MaxKey => 127,
            Self::Number => return None,
        };
        Some(code)
    }

    /// Look up a type by its `$type` code.
    pub fn from_code(code: i32) -> Option<Self> {
        let ty = match code {
            1 => Self::Double,
            2 => Self::String,
            3 => Self::Document,
            4 => Self::Array,
            5 => Self::Binary,
            7 => Self::ObjectId,
            8 => Self::Boolean,
            9 => Self::DateTime,
            10 => Self::Null,
            11 => Self::RegularExpression,
            13 => Self::JavaScriptCode,
            15 => Self::JavaScriptCodeWithScope,
            16 => Self::Int32,
            17 => Self::Timestamp,
            18 => Self::Int64,
            19 => Self::Decimal128,
            -1 => Self::MinKey,
            127 => Self::MaxKey,
            _ => return None,
        };
        Some(ty)
    }

    /// The concrete type of a value.
    ///
    /// Deprecated wire types (undefined, symbol, DB pointer) have no meta-type.
    pub fn of(value: &Bson) -> Option<Self> {
        let ty = match value.element_type() {
            ElementType::Double => Self::Double,
            ElementType::String => Self::String,
            ElementType::EmbeddedDocument => Self::Document,
            ElementType::Array => Self::Array,
            ElementType::Binary => Self::Binary,
            ElementType::ObjectId => Self::ObjectId,
            ElementType::Boolean => Self::Boolean,
            ElementType::DateTime => Self::DateTime,
            ElementType::Null => Self::Null,
            ElementType::RegularExpression => Self::RegularExpression,
            ElementType::JavaScriptCode => Self::JavaScriptCode,
            ElementType::JavaScriptCodeWithScope => Self::JavaScriptCodeWithScope,
            ElementType::Int32 => Self::Int32,
            ElementType::Timestamp => Self::Timestamp,
            ElementType::Int64 => Self::Int64,
            ElementType::Decimal128 => Self::Decimal128,
            ElementType::MinKey => Self::MinKey,
            ElementType::MaxKey => Self::MaxKey,
            _ => return None,
        };
        Some(ty)
    }

    /// Check whether this is a compiler macro rather than a wire type.
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Number)
    }

    /// Check whether a value of type `other` satisfies a check for `self`.
    pub fn matches(self, other: BsonType) -> bool {
        match self {
            Self::Number => Self::NUMERIC.contains(&other),
            _ => self == other,
        }
    }

    /// The MongoDB string alias.
    pub fn alias(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Document => "object",
            Self::Array => "array",
            Self::Binary => "binData",
            Self::ObjectId => "objectId",
            Self::Boolean => "bool",
            Self::DateTime => "date",
            Self::Null => "null",
            Self::RegularExpression => "regex",
            Self::JavaScriptCode => "javascript",
            Self::JavaScriptCodeWithScope => "javascriptWithScope",
            Self::Int32 => "int",
            Self::Timestamp => "timestamp",
            Self::Int64 => "long",
            Self::Decimal128 => "decimal",
            Self::MinKey => "minKey",
            Self::MaxKey => "maxKey",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for BsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Error returned when parsing an unknown type alias.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bson type alias: {0}")]
pub struct UnknownBsonType(pub String);

impl FromStr for BsonType {
    type Err = UnknownBsonType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "double" => Self::Double,
            "string" => Self::String,
            "object" => Self::Document,
            "array" => Self::Array,
            "binData" => Self::Binary,
            "objectId" => Self::ObjectId,
            "bool" => Self::Boolean,
            "date" => Self::DateTime,
            "null" => Self::Null,
            "regex" => Self::RegularExpression,
            "javascript" => Self::JavaScriptCode,
            "javascriptWithScope" => Self::JavaScriptCodeWithScope,
            "int" => Self::Int32,
            "timestamp" => Self::Timestamp,
            "long" => Self::Int64,
            "decimal" => Self::Decimal128,
            "minKey" => Self::MinKey,
            "maxKey" => Self::MaxKey,
            "number" => Self::Number,
            other => return Err(UnknownBsonType(other.to_string())),
        };
        Ok(ty)
    }
}
