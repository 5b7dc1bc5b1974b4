use crate::{
    area::{AreaSelector, Mode, Outcome},
    conf::Conf,
    geocoding::{Geocoder, Nominatim},
    Error, Result,
};

pub async fn forward(query: &str, conf: &Conf) -> Result<()> {
    let geocoder = Nominatim::from_conf(conf)?;
    match geocoder.forward(query).await? {
        Some(place) => println!("{}, {} {}", place.point.lat, place.point.lon, place.label),
        None => Err(Error::NotFound(format!("Nothing found for \"{query}\"")))?,
    }
    Ok(())
}

/// Prints the label a map click on the given point would get, falling back
/// to the coordinates when the lookup fails.
pub async fn reverse(lat: f64, lon: f64, conf: &Conf) -> Result<()> {
    let geocoder = Nominatim::from_conf(conf)?;
    println!("{}", point_label(geocoder, conf, lat, lon).await?);
    Ok(())
}

async fn point_label<G: Geocoder>(geocoder: G, conf: &Conf, lat: f64, lon: f64) -> Result<String> {
    let mut selector = AreaSelector::new(geocoder).lookup_timeout(conf.geocoder_timeout);
    selector.set_mode(Mode::Point);
    if let Outcome::Degraded(warning) = selector.handle_map_click(lat, lon).await? {
        eprintln!("{warning}");
    }
    Ok(selector.area().label().unwrap_or_default().to_string())
}

#[cfg(test)]
mod test {
    use super::point_label;
    use crate::{conf::Conf, test::MockGeocoder, Result};
    use tokio::test;

    fn conf() -> Conf {
        Conf::from_lookup(|_: &str| None).unwrap()
    }

    #[test]
    async fn label_from_geocoder() -> Result<()> {
        let geocoder = MockGeocoder::default().reverse_label("Calle 26, Bogotá");
        assert_eq!("Calle 26, Bogotá", point_label(geocoder, &conf(), 4.65, -74.1).await?);
        Ok(())
    }

    #[test]
    async fn numeric_fallback() -> Result<()> {
        let geocoder = MockGeocoder::default().failing();
        assert_eq!(
            "4.6500, -74.1000",
            point_label(geocoder, &conf(), 4.65, -74.1).await?
        );
        Ok(())
    }

    #[test]
    async fn invalid_input() {
        assert!(point_label(MockGeocoder::default(), &conf(), 91.0, 0.0).await.is_err());
    }
}
