mod model;
pub use model::PlaceRecord;
pub use model::PlaceStatus;
mod view;
pub use view::LeadsView;
pub use view::PlaceStore;
