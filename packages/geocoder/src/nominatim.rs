//! Nominatim / OpenStreetMap geocoding provider.
//!
//! Settlements are looked up with a free-form query built from the
//! settlement name, its subdistrict, and an optional fixed district
//! context (e.g. "Budaun, Uttar Pradesh"). The public instance enforces
//! a rate limit of 1 request per second; the dispatcher's sequential
//! per-entity calls stay within it as long as a single dispatcher is
//! used per provider instance.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;

use crate::{GeocodeError, GeocodeProvider, GeocodeQuery, Located};

/// Geocoding provider backed by a Nominatim instance.
pub struct NominatimProvider {
    client: reqwest::Client,
    base_url: String,
    /// Appended to every query for disambiguation (district, state).
    region_context: Option<String>,
}

impl NominatimProvider {
    /// A provider against `base_url` (e.g.
    /// `https://nominatim.openstreetmap.org/search`).
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
            region_context: None,
        }
    }

    /// Appends a fixed region context (district, state) to every query.
    #[must_use]
    pub fn with_region_context(mut self, context: impl Into<String>) -> Self {
        self.region_context = Some(context.into());
        self
    }

    fn build_query(&self, query: &GeocodeQuery) -> String {
        let mut q = format!("{}, {}", query.name, query.subdistrict_name);
        if let Some(context) = &self.region_context {
            q.push_str(", ");
            q.push_str(context);
        }
        q
    }
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    async fn locate(&self, query: &GeocodeQuery) -> Result<Option<Located>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", self.build_query(query).as_str()),
                ("format", "jsonv2"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim jsonv2 response into coordinates.
///
/// An empty result array is a clean no-match, not an error.
fn parse_response(body: &serde_json::Value) -> Result<Option<Located>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let longitude = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(Located {
        latitude,
        longitude,
    }))
}
