//! Address lookup for frame locations.
//!
//! [`Geocoder`] is the seam between the front end and the lookup service.
//! [`GoogleGeocoder`] talks to the Google Geocoding API.

mod google;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Location;

pub use google::{parse_response, GoogleGeocoder};

/// One result of a forward lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    /// Human-readable address.
    pub formatted_address: String,
    /// Coordinates of the address.
    pub location: Location,
}

/// Resolves coordinates to addresses and back.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Address at `location`, or `None` when the service knows nothing there.
    async fn reverse(&self, location: Location) -> Result<Option<String>>;

    /// Places matching a free-text query, best first.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>>;
}
