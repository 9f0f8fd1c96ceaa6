// Canonical flight-search model consumed by the UI layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SearchDefaults;
use crate::error::ApiError;

pub const MAX_PASSENGERS: u8 = 9;
pub const MAX_CHILDREN: u8 = 8;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

// Airport plus whether it came from the curated/nearby list rather than a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularAirport {
    #[serde(flatten)]
    pub airport: Airport,
    pub popular: bool,
}

impl PopularAirport {
    pub fn new(airport: Airport, popular: bool) -> Self {
        Self { airport, popular }
    }

    pub fn code(&self) -> &str {
        &self.airport.code
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.airport.entity_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEndpoint {
    pub airport: Airport,
    // HH:MM, 24-hour, in the zone the provider reported
    pub time: String,
    // YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    pub duration: String,
    pub flight_number: String,
    pub aircraft: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    pub name: String,
    pub code: String,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub total: f64,
    pub currency: String,
    pub formatted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Best,
    PriceHigh,
    Fastest,
    OutboundTakeOffTime,
    OutboundLandingTime,
    ReturnTakeOffTime,
    ReturnLandingTime,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Best => "best",
            SortBy::PriceHigh => "price_high",
            SortBy::Fastest => "fastest",
            SortBy::OutboundTakeOffTime => "outbound_take_off_time",
            SortBy::OutboundLandingTime => "outbound_landing_time",
            SortBy::ReturnTakeOffTime => "return_take_off_time",
            SortBy::ReturnLandingTime => "return_landing_time",
        }
    }
}

// One priced itinerary. Only the outbound leg is represented in `segments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: Airline,
    pub segments: Vec<FlightSegment>,
    pub price: Price,
    pub duration: String,
    pub stops: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_details: Vec<String>,
    pub fare_type: CabinClass,
    pub booking_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Flight {
    pub fn origin(&self) -> Option<&Airport> {
        self.segments.first().map(|s| &s.departure.airport)
    }

    pub fn destination(&self) -> Option<&Airport> {
        self.segments.last().map(|s| &s.arrival.airport)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    pub origin_sky_id: String,
    pub destination_sky_id: String,
    pub origin_entity_id: String,
    pub destination_entity_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub cabin_class: Option<CabinClass>,
    #[serde(default)]
    pub adults: Option<u8>,
    #[serde(default)]
    pub children: Option<u8>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl FlightSearchRequest {
    // One-way request between two airports; every optional field falls back
    // to the client's search defaults.
    pub fn one_way(origin: &Airport, destination: &Airport, date: NaiveDate) -> Self {
        Self {
            origin_sky_id: origin.code.clone(),
            destination_sky_id: destination.code.clone(),
            // A bare code is accepted here; the client resolves it before searching
            origin_entity_id: origin.entity_id.clone().unwrap_or_else(|| origin.code.clone()),
            destination_entity_id: destination
                .entity_id
                .clone()
                .unwrap_or_else(|| destination.code.clone()),
            date,
            return_date: None,
            cabin_class: None,
            adults: None,
            children: None,
            sort_by: None,
            currency: None,
            market: None,
            country_code: None,
        }
    }

    pub fn round_trip(
        origin: &Airport,
        destination: &Airport,
        date: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            return_date: Some(return_date),
            ..Self::one_way(origin, destination, date)
        }
    }

    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn has_airport_identifiers(&self) -> bool {
        [
            &self.origin_sky_id,
            &self.destination_sky_id,
            &self.origin_entity_id,
            &self.destination_entity_id,
        ]
        .iter()
        .all(|id| !id.trim().is_empty())
    }

    // Checks the request as it will be sent, with unset passenger counts taken
    // from `defaults`. Does not check airport identifiers.
    pub fn validate(&self, defaults: &SearchDefaults) -> Result<(), ApiError> {
        if let Some(return_date) = self.return_date {
            if return_date <= self.date {
                return Err(ApiError::Validation(
                    "Return date must be after departure date".to_string(),
                ));
            }
        }

        let adults = self.adults.unwrap_or(defaults.adults);
        let children = self.children.unwrap_or(0);
        if !(1..=MAX_PASSENGERS).contains(&adults) {
            return Err(ApiError::Validation(format!(
                "Passengers must be between 1 and {}",
                MAX_PASSENGERS
            )));
        }
        if children > MAX_CHILDREN {
            return Err(ApiError::Validation(format!(
                "Children must be between 0 and {}",
                MAX_CHILDREN
            )));
        }
        if adults + children > MAX_PASSENGERS {
            return Err(ApiError::Validation(format!(
                "Total passengers cannot exceed {}",
                MAX_PASSENGERS
            )));
        }

        if self.origin_entity_id.trim() == self.destination_entity_id.trim() {
            return Err(ApiError::Validation(
                "Destination must be different from origin".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchResponse {
    pub flights: Vec<Flight>,
    // Provider-reported total; can exceed flights.len() after truncation
    pub total_results: usize,
    pub search_id: String,
    pub status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    pub request_count: usize,
    pub remaining_requests: usize,
    pub cache_size: usize,
    pub near_limit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(code: &str, entity: Option<&str>) -> Airport {
        Airport {
            code: code.to_string(),
            name: format!("{} Airport", code),
            city: String::new(),
            country: String::new(),
            entity_id: entity.map(str::to_string),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_one_way_falls_back_to_code_for_missing_entity() {
        let request = FlightSearchRequest::one_way(
            &airport("JFK", Some("95565058")),
            &airport("LHR", None),
            date("2025-06-01"),
        );
        assert_eq!(request.origin_entity_id, "95565058");
        assert_eq!(request.destination_entity_id, "LHR");
        assert!(!request.is_round_trip());
        assert!(request.validate(&SearchDefaults::default()).is_ok());
    }

    #[test]
    fn test_return_date_must_follow_departure() {
        let jfk = airport("JFK", Some("1"));
        let lhr = airport("LHR", Some("2"));

        let same_day =
            FlightSearchRequest::round_trip(&jfk, &lhr, date("2025-06-01"), date("2025-06-01"));
        assert!(matches!(
            same_day.validate(&SearchDefaults::default()),
            Err(ApiError::Validation(_))
        ));

        let later =
            FlightSearchRequest::round_trip(&jfk, &lhr, date("2025-06-01"), date("2025-06-08"));
        assert!(later.validate(&SearchDefaults::default()).is_ok());
    }

    #[test]
    fn test_passenger_limits() {
        let mut request = FlightSearchRequest::one_way(
            &airport("JFK", Some("1")),
            &airport("LHR", Some("2")),
            date("2025-06-01"),
        );
        request.adults = Some(0);
        assert!(request.validate(&SearchDefaults::default()).is_err());

        request.adults = Some(5);
        request.children = Some(5);
        assert!(request.validate(&SearchDefaults::default()).is_err());

        request.children = Some(4);
        assert!(request.validate(&SearchDefaults::default()).is_ok());
    }

    #[test]
    fn test_unset_adults_use_configured_default() {
        let mut request = FlightSearchRequest::one_way(
            &airport("JFK", Some("1")),
            &airport("LHR", Some("2")),
            date("2025-06-01"),
        );
        request.children = Some(2);
        let defaults = SearchDefaults {
            adults: 8,
            ..Default::default()
        };
        assert!(request.validate(&SearchDefaults::default()).is_ok());
        assert!(request.validate(&defaults).is_err());

        request.adults = Some(1);
        assert!(request.validate(&defaults).is_ok());

        request.adults = None;
        request.children = None;
        let no_adults = SearchDefaults {
            adults: 0,
            ..Default::default()
        };
        assert!(request.validate(&no_adults).is_err());
    }

    #[test]
    fn test_same_origin_and_destination_rejected() {
        let request = FlightSearchRequest::one_way(
            &airport("JFK", Some("1")),
            &airport("JFK", Some("1")),
            date("2025-06-01"),
        );
        assert!(request.validate(&SearchDefaults::default()).is_err());
    }

    #[test]
    fn test_missing_identifiers_detected() {
        let mut request = FlightSearchRequest::one_way(
            &airport("JFK", Some("1")),
            &airport("LHR", Some("2")),
            date("2025-06-01"),
        );
        assert!(request.has_airport_identifiers());
        request.destination_entity_id = "  ".to_string();
        assert!(!request.has_airport_identifiers());
    }

    #[test]
    fn test_popular_airport_serializes_flat() {
        let popular = PopularAirport::new(airport("JFK", Some("1")), true);
        let json = serde_json::to_value(&popular).unwrap();
        assert_eq!(json["code"], "JFK");
        assert_eq!(json["entityId"], "1");
        assert_eq!(json["popular"], true);
    }
}
