//! GeoJSON geometries and the geospatial operator builder.
//!
//! Geometries are validated on construction; once built they always render to
//! a well-formed GeoJSON document.
//!
//! ```rust
//! use quarry_filter::geo::{self, GeoOperator, Geometry, Point};
//!
//! let store = Geometry::Point(Point::new(-73.97, 40.77).unwrap());
//! let fragment = geo::operator("location", GeoOperator::Near, &store, Some(500.0), None);
//!
//! assert!(fragment.get_document("location").unwrap().contains_key("$near"));
//! ```

use bson::{Bson, Document, doc};

use crate::error::{FilterError, FilterResult};

/// A longitude/latitude position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    longitude: f64,
    latitude: f64,
}

impl Point {
    /// Create a validated point.
    pub fn new(longitude: f64, latitude: f64) -> FilterResult<Self> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(FilterError::invalid_geometry(format!(
                "longitude {} out of range [-180, 180]",
                longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(FilterError::invalid_geometry(format!(
                "latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    fn position(&self) -> Bson {
        Bson::Array(vec![
            Bson::Double(self.longitude),
            Bson::Double(self.latitude),
        ])
    }

    /// Render as a GeoJSON `Point`.
    pub fn to_document(&self) -> Document {
        doc! { "type": "Point", "coordinates": self.position() }
    }
}

/// A polygon made of one exterior ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Vec<Point>>,
}

impl Polygon {
    /// Create a polygon from its exterior ring.
    pub fn new(exterior: Vec<Point>) -> FilterResult<Self> {
        Self::with_holes(exterior, Vec::new())
    }

    /// Create a polygon with interior rings.
    pub fn with_holes(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> FilterResult<Self> {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(exterior);
        rings.extend(holes);

        for (index, ring) in rings.iter().enumerate() {
            if ring.len() < 4 {
                return Err(FilterError::invalid_geometry(format!(
                    "polygon ring {} has {} positions, at least 4 are required",
                    index,
                    ring.len()
                )));
            }
            if ring.first() != ring.last() {
                return Err(FilterError::invalid_geometry(format!(
                    "polygon ring {} is not closed",
                    index
                )));
            }
        }

        Ok(Self { rings })
    }

    /// The exterior ring.
    pub fn exterior(&self) -> &[Point] {
        &self.rings[0]
    }

    /// The interior rings.
    pub fn holes(&self) -> &[Vec<Point>] {
        &self.rings[1..]
    }

    /// Render as a GeoJSON `Polygon`.
    pub fn to_document(&self) -> Document {
        let rings: Vec<Bson> = self
            .rings
            .iter()
            .map(|ring| Bson::Array(ring.iter().map(Point::position).collect()))
            .collect();
        doc! { "type": "Polygon", "coordinates": rings }
    }
}

/// Any supported GeoJSON geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Point),
    /// Two or more connected positions.
    LineString(Vec<Point>),
    /// A polygon.
    Polygon(Polygon),
    /// A set of positions.
    MultiPoint(Vec<Point>),
}

impl Geometry {
    /// Create a validated line string.
    pub fn line_string(points: Vec<Point>) -> FilterResult<Self> {
        if points.len() < 2 {
            return Err(FilterError::invalid_geometry(format!(
                "line string has {} positions, at least 2 are required",
                points.len()
            )));
        }
        Ok(Self::LineString(points))
    }

    /// Create a validated multi-point.
    pub fn multi_point(points: Vec<Point>) -> FilterResult<Self> {
        if points.is_empty() {
            return Err(FilterError::invalid_geometry("multi-point has no positions"));
        }
        Ok(Self::MultiPoint(points))
    }

    /// The GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPoint(_) => "MultiPoint",
        }
    }

    /// Render as a GeoJSON document.
    pub fn to_document(&self) -> Document {
        match self {
            Self::Point(point) => point.to_document(),
            Self::Polygon(polygon) => polygon.to_document(),
            Self::LineString(points) | Self::MultiPoint(points) => {
                let positions: Vec<Bson> = points.iter().map(Point::position).collect();
                doc! { "type": self.type_name(), "coordinates": positions }
            }
        }
    }
}

impl From<Point> for Geometry {
    fn from(point: Point) -> Self {
        Self::Point(point)
    }
}

impl From<Polygon> for Geometry {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon(polygon)
    }
}

/// Geospatial query operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoOperator {
    /// `$near`
    Near,
    /// `$nearSphere`
    NearSphere,
    /// `$geoWithin`
    GeoWithin,
    /// `$geoIntersects`
    GeoIntersects,
}

impl GeoOperator {
    /// The operator keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Near => "$near",
            Self::NearSphere => "$nearSphere",
            Self::GeoWithin => "$geoWithin",
            Self::GeoIntersects => "$geoIntersects",
        }
    }
}

/// Build `{key: {op: {"$geometry": ..., "$maxDistance"?: ..., "$minDistance"?: ...}}}`.
pub fn operator(
    key: &str,
    op: GeoOperator,
    geometry: &Geometry,
    max_distance: Option<f64>,
    min_distance: Option<f64>,
) -> Document {
    let mut body = doc! { "$geometry": geometry.to_document() };
    if let Some(max) = max_distance {
        body.insert("$maxDistance", max);
    }
    if let Some(min) = min_distance {
        body.insert("$minDistance", min);
    }

    let mut clause = Document::new();
    clause.insert(op.keyword(), body);

    let mut out = Document::new();
    out.insert(key, clause);
    out
}
