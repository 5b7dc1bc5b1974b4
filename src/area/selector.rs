use super::{LatLon, Mode, SearchArea, MAX_RADIUS_KM, MIN_RADIUS_KM};
use crate::{geocoding::Geocoder, Result};
use std::{fmt, time::Duration};
use tokio::time::timeout;
use tracing::{debug, warn};

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a mutation that may have to degrade instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Unchanged,
    Degraded(Warning),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Reverse lookup failed, the numeric label was used instead.
    ReverseGeocodeFailed { point: LatLon, reason: String },
    ForwardGeocodeFailed { query: String, reason: String },
    NoMatch { query: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ReverseGeocodeFailed { point, reason } => {
                write!(f, "Address lookup for {} failed: {reason}", point.label())
            }
            Warning::ForwardGeocodeFailed { query, reason } => {
                write!(f, "Search for \"{query}\" failed: {reason}")
            }
            Warning::NoMatch { query } => write!(f, "Nothing found for \"{query}\""),
        }
    }
}

/// Owns a [SearchArea] and applies map clicks, text searches and manual
/// edits to it according to the current mode.
pub struct AreaSelector<G> {
    area: SearchArea,
    geocoder: G,
    lookup_timeout: Duration,
}

impl<G: Geocoder> AreaSelector<G> {
    pub fn new(geocoder: G) -> Self {
        Self::with_area(SearchArea::default(), geocoder)
    }

    pub fn with_area(area: SearchArea, geocoder: G) -> Self {
        AreaSelector {
            area,
            geocoder,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn area(&self) -> &SearchArea {
        &self.area
    }

    pub fn set_mode(&mut self, mode: Mode) {
        debug!(from = %self.area.mode, to = %mode, "Switching area mode");
        self.area.mode = mode;
    }

    pub async fn handle_map_click(&mut self, lat: f64, lon: f64) -> Result<Outcome> {
        let point = LatLon::new(lat, lon)?;
        match self.area.mode {
            Mode::Point | Mode::Circle => {
                let (label, warning) = self.resolve_label(point).await;
                self.area.center = Some(point);
                self.area.label = Some(label);
                Ok(match warning {
                    Some(warning) => Outcome::Degraded(warning),
                    None => Outcome::Applied,
                })
            }
            Mode::Polygon => {
                self.area.polygon.push(point);
                Ok(Outcome::Applied)
            }
        }
    }

    pub fn undo_last_vertex(&mut self) -> Outcome {
        if self.area.mode != Mode::Polygon {
            return Outcome::Unchanged;
        }
        match self.area.polygon.pop() {
            Some(_) => Outcome::Applied,
            None => Outcome::Unchanged,
        }
    }

    pub fn clear_polygon(&mut self) -> Outcome {
        if self.area.mode != Mode::Polygon {
            return Outcome::Unchanged;
        }
        self.area.polygon.clear();
        Outcome::Applied
    }

    pub async fn search_by_text(&mut self, query: &str) -> Outcome {
        if self.area.mode == Mode::Polygon {
            return Outcome::Unchanged;
        }
        let query = query.trim();
        if query.is_empty() {
            return Outcome::Unchanged;
        }
        let warning = match timeout(self.lookup_timeout, self.geocoder.forward(query)).await {
            Ok(Ok(Some(place))) => {
                self.area.center = Some(place.point);
                self.area.label = Some(place.label);
                return Outcome::Applied;
            }
            Ok(Ok(None)) => Warning::NoMatch {
                query: query.into(),
            },
            Ok(Err(e)) => Warning::ForwardGeocodeFailed {
                query: query.into(),
                reason: e.to_string(),
            },
            Err(_) => Warning::ForwardGeocodeFailed {
                query: query.into(),
                reason: format!("timed out after {:?}", self.lookup_timeout),
            },
        };
        warn!(%warning, "Area search degraded");
        Outcome::Degraded(warning)
    }

    pub fn set_radius_km(&mut self, value: f64) -> Outcome {
        if self.area.mode != Mode::Circle {
            return Outcome::Unchanged;
        }
        self.area.radius_km = clamp_radius(value);
        Outcome::Applied
    }

    /// Radius as typed by the user. Anything that isn't a number becomes the
    /// minimum radius.
    pub fn set_radius_input(&mut self, raw: &str) -> Outcome {
        self.set_radius_km(raw.trim().parse::<f64>().unwrap_or(MIN_RADIUS_KM))
    }

    pub fn set_center_manually(&mut self, lat: f64, lon: f64) -> Result<()> {
        self.area.center = Some(LatLon::new(lat, lon)?);
        Ok(())
    }

    async fn resolve_label(&self, point: LatLon) -> (String, Option<Warning>) {
        let reason = match timeout(self.lookup_timeout, self.geocoder.reverse(point)).await {
            Ok(Ok(Some(label))) if !label.trim().is_empty() => {
                return (label.trim().to_string(), None)
            }
            Ok(Ok(_)) => "no address found".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", self.lookup_timeout),
        };
        let warning = Warning::ReverseGeocodeFailed { point, reason };
        warn!(%warning, "Falling back to numeric label");
        (point.label(), Some(warning))
    }
}

fn clamp_radius(value: f64) -> f64 {
    if value.is_nan() || value <= 0.0 {
        return MIN_RADIUS_KM;
    }
    value.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
}
