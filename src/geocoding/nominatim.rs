use super::{GeocodedPlace, Geocoder};
use crate::{area::LatLon, conf::Conf, Error, Result};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<Address>,
}

#[derive(Deserialize, Default)]
struct Address {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

impl Address {
    fn locality(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village]
            .into_iter()
            .flatten()
            .map(|it| it.trim())
            .find(|it| !it.is_empty())
    }
}

#[derive(Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// OpenStreetMap Nominatim client.
#[derive(Clone)]
pub struct Nominatim {
    client: Client,
    base_url: Url,
}

impl Nominatim {
    pub fn new(base_url: Url, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Nominatim { client, base_url })
    }

    pub fn from_conf(conf: &Conf) -> Result<Self> {
        Nominatim::new(
            conf.geocoder_url.clone(),
            &conf.user_agent,
            conf.geocoder_timeout,
        )
    }

    fn reverse_url(&self, point: LatLon) -> Result<Url> {
        let mut url = self.base_url.join("reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &point.lat.to_string())
            .append_pair("lon", &point.lon.to_string())
            .append_pair("zoom", "18")
            .append_pair("addressdetails", "1");
        Ok(url)
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", "1");
        Ok(url)
    }
}

impl Geocoder for Nominatim {
    async fn reverse(&self, point: LatLon) -> Result<Option<String>> {
        let url = self.reverse_url(point)?;
        info!(url = url.as_str(), "Querying Nominatim");
        let res = self.client.get(url).send().await?;
        info!(response_status = ?res.status(), "Got response from Nominatim");
        _reverse(res).await
    }

    async fn forward(&self, query: &str) -> Result<Option<GeocodedPlace>> {
        let url = self.search_url(query)?;
        info!(url = url.as_str(), "Querying Nominatim");
        let res = self.client.get(url).send().await?;
        info!(response_status = ?res.status(), "Got response from Nominatim");
        _forward(res).await
    }
}

async fn _reverse(res: Response) -> Result<Option<String>> {
    if !res.status().is_success() {
        Err(Error::Generic(format!(
            "Unexpected response status: {}",
            res.status()
        )))?
    }
    // Unknown locations come back as {"error": "Unable to geocode"}
    let res: ReverseResponse = res.json().await?;
    let address = res.address.unwrap_or_default();
    let road = address.road.as_deref().map(str::trim).filter(|it| !it.is_empty());
    if let (Some(road), Some(locality)) = (road, address.locality()) {
        return Ok(Some(format!("{road}, {locality}")));
    }
    Ok(res
        .display_name
        .map(|it| it.trim().to_string())
        .filter(|it| !it.is_empty()))
}

async fn _forward(res: Response) -> Result<Option<GeocodedPlace>> {
    if !res.status().is_success() {
        Err(Error::Generic(format!(
            "Unexpected response status: {}",
            res.status()
        )))?
    }
    let res: Vec<SearchResult> = res.json().await?;
    let Some(top) = res.into_iter().next() else {
        return Ok(None);
    };
    let lat = top
        .lat
        .parse::<f64>()
        .map_err(|_| Error::Generic(format!("Invalid latitude: {}", top.lat)))?;
    let lon = top
        .lon
        .parse::<f64>()
        .map_err(|_| Error::Generic(format!("Invalid longitude: {}", top.lon)))?;
    Ok(Some(GeocodedPlace {
        point: LatLon::new(lat, lon)?,
        label: top.display_name,
    }))
}

#[cfg(test)]
mod test {
    use super::Nominatim;
    use crate::{area::LatLon, Result};
    use http::response::Builder;
    use std::time::Duration;
    use tokio::test;
    use url::Url;

    #[test]
    async fn reverse_road_and_city() -> Result<()> {
        let res_json = r#"
        {
            "place_id": 12345,
            "lat": "4.7100",
            "lon": "-74.0500",
            "display_name": "Carrera 7, Usaquén, Bogotá, Bogotá D.C., Colombia",
            "address": {
                "road": "Carrera 7",
                "suburb": "Usaquén",
                "city": "Bogotá",
                "state": "Bogotá D.C.",
                "country": "Colombia"
            }
        }
        "#;
        let res = super::_reverse(Builder::new().status(200).body(res_json).unwrap().into()).await?;
        assert_eq!(Some("Carrera 7, Bogotá".to_string()), res);
        Ok(())
    }

    #[test]
    async fn reverse_town_counts_as_city() -> Result<()> {
        let res_json = r#"
        {
            "display_name": "Calle 3, Chía, Cundinamarca, Colombia",
            "address": { "road": "Calle 3", "town": "Chía" }
        }
        "#;
        let res = super::_reverse(Builder::new().status(200).body(res_json).unwrap().into()).await?;
        assert_eq!(Some("Calle 3, Chía".to_string()), res);
        Ok(())
    }

    #[test]
    async fn reverse_without_road_uses_display_name() -> Result<()> {
        let res_json = r#"
        {
            "display_name": "Parque Nacional Natural Chingaza, Colombia",
            "address": { "city": "Fómeque" }
        }
        "#;
        let res = super::_reverse(Builder::new().status(200).body(res_json).unwrap().into()).await?;
        assert_eq!(Some("Parque Nacional Natural Chingaza, Colombia".to_string()), res);
        Ok(())
    }

    #[test]
    async fn reverse_unable_to_geocode() -> Result<()> {
        let res_json = r#"{ "error": "Unable to geocode" }"#;
        let res = super::_reverse(Builder::new().status(200).body(res_json).unwrap().into()).await?;
        assert_eq!(None, res);
        Ok(())
    }

    #[test]
    async fn reverse_unexpected_res_code() {
        let res = super::_reverse(Builder::new().status(503).body("").unwrap().into()).await;
        assert!(res.is_err());
    }

    #[test]
    async fn forward_top_match() -> Result<()> {
        let res_json = r#"
        [
            {
                "place_id": 1,
                "lat": "6.2443382",
                "lon": "-75.573553",
                "display_name": "Medellín, Antioquia, Colombia"
            },
            {
                "place_id": 2,
                "lat": "1.0",
                "lon": "1.0",
                "display_name": "Second"
            }
        ]
        "#;
        let res = super::_forward(Builder::new().status(200).body(res_json).unwrap().into())
            .await?
            .unwrap();
        assert_eq!(LatLon { lat: 6.2443382, lon: -75.573553 }, res.point);
        assert_eq!("Medellín, Antioquia, Colombia", res.label);
        Ok(())
    }

    #[test]
    async fn forward_no_match() -> Result<()> {
        let res = super::_forward(Builder::new().status(200).body("[]").unwrap().into()).await?;
        assert!(res.is_none());
        Ok(())
    }

    #[test]
    async fn forward_invalid_coordinates() {
        let res_json = r#"[{ "lat": "x", "lon": "1", "display_name": "Broken" }]"#;
        let res = super::_forward(Builder::new().status(200).body(res_json).unwrap().into()).await;
        assert!(res.is_err());
    }

    #[test]
    async fn urls() -> Result<()> {
        let nominatim = Nominatim::new(
            Url::parse("https://nominatim.example.org/")?,
            "leadscout-test",
            Duration::from_secs(1),
        )?;
        assert_eq!(
            "https://nominatim.example.org/reverse?format=json&lat=4.71&lon=-74.05&zoom=18&addressdetails=1",
            nominatim.reverse_url(LatLon { lat: 4.71, lon: -74.05 })?.as_str(),
        );
        assert_eq!(
            "https://nominatim.example.org/search?format=json&q=Bogot%C3%A1+Colombia&limit=1",
            nominatim.search_url("Bogotá Colombia")?.as_str(),
        );
        Ok(())
    }
}
