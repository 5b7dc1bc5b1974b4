use crate::{area::LatLon, Result};
use std::future::Future;

mod nominatim;
pub use nominatim::Nominatim;

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub point: LatLon,
    pub label: String,
}

/// Address lookups backing the area selector. Both calls are best effort: an
/// `Ok(None)` means the provider had nothing useful to say.
pub trait Geocoder {
    fn reverse(&self, point: LatLon) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Top match only.
    fn forward(&self, query: &str) -> impl Future<Output = Result<Option<GeocodedPlace>>> + Send;
}
