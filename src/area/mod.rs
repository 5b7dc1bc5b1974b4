mod model;
pub use model::LatLon;
pub use model::Mode;
pub use model::SearchArea;
pub use model::MAX_RADIUS_KM;
pub use model::MIN_RADIUS_KM;
mod selector;
pub use selector::AreaSelector;
pub use selector::Outcome;
