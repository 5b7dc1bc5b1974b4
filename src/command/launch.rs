use super::session_client;
use crate::{
    area::{AreaSelector, LatLon, Mode, Outcome},
    conf::Conf,
    execution::{LaunchForm, LaunchRequest, DEFAULT_MAX_LEADS},
    geocoding::{Geocoder, Nominatim},
    Error, Result,
};
use clap::Args;
use std::str::FromStr;
use tracing::{debug, info, warn};

const PREFERRED_CATEGORY: &str = "Restaurante";

/// `lat,lon,km`
#[derive(Debug, Clone, PartialEq)]
pub struct CircleArg {
    pub center: LatLon,
    pub radius: String,
}

impl FromStr for CircleArg {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let (center, radius) = raw
            .rsplit_once(',')
            .ok_or_else(|| Error::InvalidInput(format!("Expected lat,lon,km, got {raw}")))?;
        Ok(CircleArg {
            center: center.parse()?,
            radius: radius.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolygonStep {
    Vertex(LatLon),
    Undo,
    Clear,
}

/// `lat,lon;lat,lon;...`, replayed as map clicks. `undo` drops the last
/// vertex and `clear` starts over.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonArg(pub Vec<PolygonStep>);

impl FromStr for PolygonArg {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let steps = raw
            .split(';')
            .map(str::trim)
            .filter(|it| !it.is_empty())
            .map(|it| match it {
                "undo" => Ok(PolygonStep::Undo),
                "clear" => Ok(PolygonStep::Clear),
                vertex => Ok(PolygonStep::Vertex(vertex.parse()?)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PolygonArg(steps))
    }
}

#[derive(Debug, Args)]
pub struct LaunchArgs {
    /// Search term, defaults to the backend's preferred category
    #[arg(long)]
    pub term: Option<String>,

    /// Search around a single point: lat,lon
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["circle", "polygon"])]
    pub point: Option<LatLon>,

    /// Search inside a circle: lat,lon,km (radius clamped to 1..100)
    #[arg(long, allow_hyphen_values = true, conflicts_with = "polygon")]
    pub circle: Option<CircleArg>,

    /// Search inside a polygon: "lat,lon;lat,lon;lat,lon", with undo and clear steps
    #[arg(long, allow_hyphen_values = true)]
    pub polygon: Option<PolygonArg>,

    /// Move the center to the top match for an address
    #[arg(long, conflicts_with = "polygon")]
    pub search: Option<String>,

    /// Override the center coordinates, keeping the current label: lat,lon
    #[arg(long, allow_hyphen_values = true, conflicts_with = "polygon")]
    pub center: Option<LatLon>,

    #[arg(long, default_value_t = DEFAULT_MAX_LEADS)]
    pub max_leads: u32,

    /// Include places without a website
    #[arg(long)]
    pub no_website: bool,

    #[arg(long)]
    pub exact_name: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    /// Pass an empty value to leave a geo field out
    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub continent: Option<String>,
}

pub async fn run(args: &LaunchArgs, conf: &Conf) -> Result<()> {
    let api = session_client(conf)?;
    let geocoder = Nominatim::from_conf(conf)?;
    let mut selector = AreaSelector::new(geocoder).lookup_timeout(conf.geocoder_timeout);
    select_area(args, &mut selector).await?;
    if let Some(geojson) = selector.area().to_geojson() {
        debug!(geojson = %serde_json::to_string(&geojson)?, "Search area");
    }
    let mut form = launch_form(args);
    if args.term.is_none() {
        match api.categories().await {
            Ok(categories) => {
                if let Some(category) = default_category(&categories) {
                    form.search_term = category;
                }
            }
            Err(e) => warn!(error = %e, "Failed to fetch categories, using the default term"),
        }
    }
    let req = LaunchRequest::new(selector.area(), &form)?;
    info!(
        search_term = %req.search_term,
        location = %req.location,
        search_type = %req.search_type,
        "Launching execution",
    );
    let res = api.launch(&req).await?;
    println!("{}", serde_json::to_string_pretty(&res)?);
    Ok(())
}

/// Applies the shape first, then `--search`, then `--center`. Without a
/// shape the selector stays in circle mode.
pub async fn select_area<G: Geocoder>(
    args: &LaunchArgs,
    selector: &mut AreaSelector<G>,
) -> Result<()> {
    if let Some(point) = args.point {
        selector.set_mode(Mode::Point);
        click(selector, point).await?;
    }
    if let Some(circle) = &args.circle {
        selector.set_mode(Mode::Circle);
        click(selector, circle.center).await?;
        selector.set_radius_input(&circle.radius);
    }
    if let Some(PolygonArg(steps)) = &args.polygon {
        selector.set_mode(Mode::Polygon);
        for step in steps {
            match step {
                PolygonStep::Vertex(vertex) => click(selector, *vertex).await?,
                PolygonStep::Undo => {
                    if let Outcome::Unchanged = selector.undo_last_vertex() {
                        warn!("Nothing to undo");
                    }
                }
                PolygonStep::Clear => {
                    selector.clear_polygon();
                }
            }
        }
    }
    if let Some(query) = &args.search {
        if let Outcome::Unchanged = selector.search_by_text(query).await {
            warn!(query = %query, mode = %selector.area().mode(), "Search ignored");
        }
    }
    if let Some(center) = args.center {
        selector.set_center_manually(center.lat, center.lon)?;
    }
    Ok(())
}

async fn click<G: Geocoder>(selector: &mut AreaSelector<G>, point: LatLon) -> Result<()> {
    if let Outcome::Degraded(warning) = selector.handle_map_click(point.lat, point.lon).await? {
        eprintln!("{warning}");
    }
    Ok(())
}

pub fn launch_form(args: &LaunchArgs) -> LaunchForm {
    let mut form = LaunchForm {
        max_leads: args.max_leads,
        has_website: !args.no_website,
        exact_name: args.exact_name.clone(),
        postal_code: args.postal_code.clone(),
        ..LaunchForm::default()
    };
    if let Some(term) = &args.term {
        form.search_term = term.clone();
    }
    if let Some(language) = &args.language {
        form.language = language.clone();
    }
    for (value, field) in [
        (&args.country, &mut form.country),
        (&args.city, &mut form.city),
        (&args.state, &mut form.state),
        (&args.continent, &mut form.continent),
    ] {
        if let Some(value) = value {
            *field = Some(value.clone());
        }
    }
    form
}

fn default_category(categories: &[String]) -> Option<String> {
    categories
        .iter()
        .find(|it| it.as_str() == PREFERRED_CATEGORY)
        .or(categories.first())
        .cloned()
}
