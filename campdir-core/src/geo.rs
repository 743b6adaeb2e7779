use crate::blueprint;
use crate::model::Location;
use crate::runtime::TargetRuntime;
use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Radius of the earth in miles, used by the radius search.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Forward geocoder over the configured provider. The provider is any
/// endpoint answering a nominatim-style JSON array for
/// `?q=<query>&format=json`.
pub struct Geocoder {
    provider_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<ProviderAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
}

impl Geocoder {
    pub fn new(geo: &blueprint::Geo) -> Self {
        Self {
            provider_url: geo.provider_url.clone(),
            api_key: geo.api_key.clone(),
        }
    }

    pub async fn geocode(&self, query: &str, runtime: &TargetRuntime) -> Result<Location> {
        let mut url = url::Url::parse(&self.provider_url)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json");
        if let Some(key) = self.api_key.as_ref() {
            url.query_pairs_mut().append_pair("key", key);
        }

        let req = reqwest::Request::new(reqwest::Method::GET, url);
        let resp = runtime.http.execute(req).await?;
        let hits: Vec<ProviderHit> = serde_json::from_slice(&resp.body)?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No geocoding result for: {}", query))?;

        let address = hit.address.unwrap_or_default();
        Ok(Location {
            lat: hit.lat.parse()?,
            lng: hit.lon.parse()?,
            formatted_address: hit.display_name,
            city: address.city,
            zipcode: address.postcode,
        })
    }
}

/// Great-circle distance between two points, in miles.
pub fn haversine_miles(a: &Location, b: &Location) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Geo;

    fn location(lat: f64, lng: f64) -> Location {
        Location {
            lat,
            lng,
            ..Default::default()
        }
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = location(42.35, -71.1);
        assert!(haversine_miles(&p, &p) < 1e-9);
    }

    #[test]
    fn test_haversine_boston_to_nyc() {
        let boston = location(42.3601, -71.0589);
        let nyc = location(40.7128, -74.0060);
        let distance = haversine_miles(&boston, &nyc);
        assert!((distance - 190.0).abs() < 5.0, "got {}", distance);
    }

    #[tokio::test]
    async fn test_geocode_parses_provider_response() {
        let server = httpmock::MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/search")
                .query_param("q", "02215")
                .query_param("format", "json");
            then.status(200).body(
                r#"[{"lat":"42.3489","lon":"-71.0987","display_name":"Boston, MA 02215","address":{"city":"Boston","postcode":"02215"}}]"#,
            );
        });

        let geocoder = Geocoder::new(&Geo {
            provider_url: format!("{}/search", server.base_url()),
            api_key: None,
        });
        let runtime = crate::runtime::tests::init();
        let location = geocoder.geocode("02215", &runtime).await.unwrap();

        assert_eq!(location.lat, 42.3489);
        assert_eq!(location.lng, -71.0987);
        assert_eq!(location.city.as_deref(), Some("Boston"));
        assert_eq!(location.zipcode.as_deref(), Some("02215"));
        mock.assert();
    }

    #[tokio::test]
    async fn test_geocode_empty_result_errors() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/search");
            then.status(200).body("[]");
        });

        let geocoder = Geocoder::new(&Geo {
            provider_url: format!("{}/search", server.base_url()),
            api_key: None,
        });
        let runtime = crate::runtime::tests::init();
        assert!(geocoder.geocode("nowhere", &runtime).await.is_err());
    }
}
