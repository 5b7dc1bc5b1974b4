use crate::{Error, Result};
use geo::{Destination, Geometry, Haversine, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Fallback center used until the user picks a location (Bogotá).
pub const DEFAULT_CENTER: LatLon = LatLon {
    lat: 4.6097,
    lon: -74.0817,
};
pub const DEFAULT_LABEL: &str = "Bogotá, Colombia";

const CIRCLE_SEGMENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Result<LatLon> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            Err(Error::InvalidInput(format!(
                "Latitude must be within [-90, 90], got {lat}"
            )))?
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            Err(Error::InvalidInput(format!(
                "Longitude must be within [-180, 180], got {lon}"
            )))?
        }
        Ok(LatLon { lat, lon })
    }

    /// Parses `"lat,lon"`.
    pub fn parse(raw: &str) -> Result<LatLon> {
        let mut parts = raw.split(',').map(str::trim);
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidInput(format!(
                "Expected \"lat,lon\", got \"{raw}\""
            )));
        };
        let lat = lat
            .parse::<f64>()
            .map_err(|_| Error::InvalidInput(format!("Invalid latitude: {lat}")))?;
        let lon = lon
            .parse::<f64>()
            .map_err(|_| Error::InvalidInput(format!("Invalid longitude: {lon}")))?;
        LatLon::new(lat, lon)
    }

    /// Numeric label used when no address is available.
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl FromStr for LatLon {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        LatLon::parse(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Mode {
    #[serde(rename = "default")]
    #[strum(to_string = "default", serialize = "point")]
    Point,
    #[serde(rename = "circle")]
    #[strum(to_string = "circle")]
    Circle,
    #[serde(rename = "polygon")]
    #[strum(to_string = "polygon")]
    Polygon,
}

/// Geographic scope of a search. Only [AreaSelector](super::AreaSelector)
/// mutates it, readers get a consistent snapshot through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArea {
    pub(super) mode: Mode,
    pub(super) center: Option<LatLon>,
    pub(super) radius_km: f64,
    pub(super) polygon: Vec<LatLon>,
    pub(super) label: Option<String>,
}

impl Default for SearchArea {
    fn default() -> Self {
        SearchArea {
            mode: Mode::Circle,
            center: Some(DEFAULT_CENTER),
            radius_km: MIN_RADIUS_KM,
            polygon: vec![],
            label: Some(DEFAULT_LABEL.into()),
        }
    }
}

impl SearchArea {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn center(&self) -> Option<LatLon> {
        self.center
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn polygon(&self) -> &[LatLon] {
        &self.polygon
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_submittable(&self) -> bool {
        match self.mode {
            Mode::Point | Mode::Circle => self.center.is_some(),
            Mode::Polygon => self.polygon.len() >= 3,
        }
    }

    /// Geometry of the active mode. Circles are approximated by a ring, the
    /// polygon ring is closed here and never in the stored vertex list.
    pub fn to_geometry(&self) -> Option<Geometry<f64>> {
        match self.mode {
            Mode::Point => self.center.map(|it| Geometry::Point(it.to_point())),
            Mode::Circle => self.circle_polygon().map(Geometry::Polygon),
            Mode::Polygon => self.polygon_geometry().map(Geometry::Polygon),
        }
    }

    pub fn to_geojson(&self) -> Option<geojson::Geometry> {
        self.to_geometry()
            .map(|it| geojson::Geometry::new(geojson::Value::from(&it)))
    }

    fn circle_polygon(&self) -> Option<Polygon<f64>> {
        let center = self.center?.to_point();
        let radius_m = self.radius_km * 1000.0;
        let ring: Vec<Point<f64>> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let bearing = 360.0 * i as f64 / CIRCLE_SEGMENTS as f64;
                Haversine::destination(center, bearing, radius_m)
            })
            .collect();
        Some(Polygon::new(LineString::from(ring), vec![]))
    }

    fn polygon_geometry(&self) -> Option<Polygon<f64>> {
        if self.polygon.len() < 3 {
            return None;
        }
        let ring: Vec<Point<f64>> = self.polygon.iter().map(|it| it.to_point()).collect();
        Some(Polygon::new(LineString::from(ring), vec![]))
    }
}
