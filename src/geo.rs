// Caller position source for the nearby-airports lookup

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    // `None` when the position is unknown, denied or unsupported.
    async fn current_position(&self) -> Option<Coordinates>;
}

// For environments without any position capability
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn current_position(&self) -> Option<Coordinates> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocation {
    async fn current_position(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}
