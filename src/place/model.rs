use crate::api::Id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use time::OffsetDateTime;

/// Sales pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum PlaceStatus {
    #[serde(rename = "por visita")]
    #[strum(to_string = "pending", serialize = "por visita")]
    Pending,
    #[serde(rename = "cliente")]
    #[strum(to_string = "client", serialize = "cliente")]
    Client,
    #[serde(rename = "visitado")]
    #[strum(to_string = "visited", serialize = "visitado")]
    Visited,
    #[serde(rename = "descartado")]
    #[strum(to_string = "discarded", serialize = "descartado")]
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: Id,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub maps_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub google_place_id: Option<String>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub reviews_count: Option<i64>,
    #[serde(default)]
    pub status: Option<PlaceStatus>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    /// Fields this client doesn't model, sent back untouched on update.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlaceRecord {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unnamed")
    }
}
