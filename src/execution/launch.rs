use crate::{
    area::{Mode, SearchArea},
    Error, Result,
};
use serde::Serialize;

pub const DEFAULT_MAX_LEADS: u32 = 50;
pub const MAX_LEADS_LIMIT: u32 = 500;
const DEFAULT_LANGUAGE: &str = "es";
const DEFAULT_COUNTRY: &str = "Colombia";
const DEFAULT_CITY: &str = "Bogotá";
const DEFAULT_STATE: &str = "Bogotá D.C.";
const DEFAULT_CONTINENT: &str = "América del Sur";

/// Form fields that travel with the area on launch.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchForm {
    pub search_term: String,
    pub max_leads: u32,
    pub has_website: bool,
    pub language: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub continent: Option<String>,
    pub postal_code: Option<String>,
    pub exact_name: Option<String>,
}

impl Default for LaunchForm {
    fn default() -> Self {
        LaunchForm {
            search_term: "Restaurante".into(),
            max_leads: DEFAULT_MAX_LEADS,
            has_website: true,
            language: DEFAULT_LANGUAGE.into(),
            country: Some(DEFAULT_COUNTRY.into()),
            city: Some(DEFAULT_CITY.into()),
            state: Some(DEFAULT_STATE.into()),
            continent: Some(DEFAULT_CONTINENT.into()),
            postal_code: None,
            exact_name: None,
        }
    }
}

/// `POST /executions/launch` body. Owns a copy of everything it needs, later
/// edits to the on-screen area don't reach an already built request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRequest {
    pub search_term: String,
    pub category: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub search_type: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_points: Option<Vec<[f64; 2]>>,
    pub max_leads: u32,
    pub has_website: bool,
    pub language: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub continent: Option<String>,
    pub postal_code: Option<String>,
    pub exact_name: Option<String>,
}

impl LaunchRequest {
    pub fn new(area: &SearchArea, form: &LaunchForm) -> Result<LaunchRequest> {
        let search_term = form.search_term.trim();
        if search_term.is_empty() {
            Err(Error::InvalidInput("Search term is required".into()))?
        }
        if !area.is_submittable() {
            Err(Error::InvalidInput(match area.mode() {
                Mode::Polygon => format!(
                    "Polygon needs at least 3 points, got {}",
                    area.polygon().len()
                ),
                _ => "Pick a location first".into(),
            }))?
        }
        let center = area.center();
        let location = area
            .label()
            .map(|it| it.to_string())
            .or_else(|| center.map(|it| it.label()))
            .unwrap_or_default();
        Ok(LaunchRequest {
            search_term: search_term.into(),
            category: search_term.into(),
            location,
            latitude: center.map(|it| it.lat),
            longitude: center.map(|it| it.lon),
            search_type: area.mode(),
            radius: match area.mode() {
                Mode::Circle => Some(area.radius_km()),
                _ => None,
            },
            polygon_points: match area.mode() {
                Mode::Polygon => Some(area.polygon().iter().map(|it| [it.lat, it.lon]).collect()),
                _ => None,
            },
            max_leads: form.max_leads.clamp(1, MAX_LEADS_LIMIT),
            has_website: form.has_website,
            language: form.language.clone(),
            country: non_blank(&form.country),
            city: non_blank(&form.city),
            state: non_blank(&form.state),
            continent: non_blank(&form.continent),
            postal_code: non_blank(&form.postal_code),
            exact_name: non_blank(&form.exact_name),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|it| !it.is_empty())
        .map(|it| it.to_string())
}
