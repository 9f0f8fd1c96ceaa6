// Data structures for the flight-data provider's JSON responses.
// Airport records vary in shape between endpoints, so they stay as raw JSON
// and go through the field rules in `normalize`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AirportListEnvelope {
    pub status: bool,
    pub message: Option<String>,
    pub data: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerStatusEnvelope {
    pub status: bool,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightSearchEnvelope {
    // Absent is treated as success; only an explicit `false` is a failure
    pub status: Option<bool>,
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub data: Option<FlightSearchData>,
}

impl FlightSearchEnvelope {
    pub fn is_failure(&self) -> bool {
        self.status == Some(false)
    }

    pub fn search_id(&self) -> String {
        self.session_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.data
                    .as_ref()
                    .and_then(|d| d.context.as_ref())
                    .and_then(|c| c.session_id.clone())
            })
            .unwrap_or_default()
    }

    pub fn total_results(&self) -> Option<usize> {
        self.data
            .as_ref()
            .and_then(|d| d.context.as_ref())
            .and_then(|c| c.total_results)
            .filter(|total| *total > 0)
    }

    pub fn into_itineraries(self) -> Vec<RawItinerary> {
        self.data.map(|d| d.itineraries).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightSearchData {
    pub context: Option<SearchContext>,
    pub itineraries: Vec<RawItinerary>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchContext {
    pub status: Option<String>,
    pub session_id: Option<String>,
    pub total_results: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItinerary {
    pub id: String,
    pub price: RawPrice,
    pub legs: Vec<RawLeg>,
    pub score: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPrice {
    pub raw: f64,
    pub formatted: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLeg {
    pub duration_in_minutes: u32,
    pub stop_count: u32,
    pub departure: String,
    pub arrival: String,
    pub carriers: RawCarriers,
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCarriers {
    pub marketing: Vec<RawCarrier>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCarrier {
    pub name: String,
    pub display_code: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSegment {
    pub origin: Value,
    pub destination: Value,
    pub departure: String,
    pub arrival: String,
    pub duration_in_minutes: u32,
    pub flight_number: String,
    pub marketing_carrier: RawCarrier,
}
