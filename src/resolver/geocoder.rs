//! External Geocoding
//!
//! The [`Geocoder`] seam turns a free-text address into coordinates. The
//! production implementation talks to a Nominatim-compatible search API.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Boxed so that `dyn Geocoder` stays object safe.
pub type GeocodeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Coordinates>>> + Send + 'a>>;

pub trait Geocoder: Send + Sync {
    /// First candidate for `address`, `Ok(None)` when the service knows no
    /// candidate.
    fn geocode<'a>(&'a self, address: &'a str) -> GeocodeFuture<'a>;
}

/// Nominatim returns coordinates as decimal strings; some compatible
/// services send plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Text(String),
    Number(f64),
}

impl Degrees {
    fn value(&self) -> Result<f64> {
        match self {
            Degrees::Text(s) => Ok(s.trim().parse()?),
            Degrees::Number(n) => Ok(*n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: Degrees,
    lon: Degrees,
}

/// Reads the first candidate of a Nominatim `format=json` search response.
pub fn parse_search_response(body: &str) -> Result<Option<Coordinates>> {
    let places: Vec<Place> = serde_json::from_str(body)?;
    match places.first() {
        Some(place) => Ok(Some(Coordinates {
            latitude: place.lat.value()?,
            longitude: place.lon.value()?,
        })),
        None => Ok(None),
    }
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying `User-Agent`.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("limit", "1"), ("q", address)])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode<'a>(&'a self, address: &'a str) -> GeocodeFuture<'a> {
        Box::pin(self.lookup(address))
    }
}
