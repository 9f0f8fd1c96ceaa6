// Mapping from provider response shapes to the canonical flight model.
// Everything here is pure; no I/O and no caching.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

use crate::models::{
    Airline, Airport, CabinClass, Flight, FlightSegment, PopularAirport, Price, SegmentEndpoint,
};
use crate::provider::{RawItinerary, RawSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportField {
    Code,
    Name,
    City,
    Country,
    EntityId,
}

// Ordered JSON pointers tried for one logical airport field; the first
// non-empty value wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: AirportField,
    pub paths: &'static [&'static str],
}

pub const AIRPORT_RULES: &[FieldRule] = &[
    FieldRule {
        field: AirportField::Code,
        paths: &[
            "/displayCode",
            "/iata",
            "/skyId",
            "/navigation/relevantFlightParams/skyId",
            "/flightPlaceId",
        ],
    },
    FieldRule {
        field: AirportField::Name,
        paths: &[
            "/presentation/suggestionTitle",
            "/name",
            "/localizedName",
            "/presentation/title",
        ],
    },
    FieldRule {
        field: AirportField::City,
        paths: &["/hierarchy/city/name", "/city", "/parent/name"],
    },
    FieldRule {
        field: AirportField::Country,
        paths: &["/hierarchy/country/name", "/country"],
    },
    FieldRule {
        field: AirportField::EntityId,
        paths: &["/entityId", "/navigation/entityId", "/skyId", "/id"],
    },
];

const AIRLINE_LOGOS: &[(&str, &str)] = &[
    ("AA", "🇺🇸"),
    ("UA", "🇺🇸"),
    ("DL", "🇺🇸"),
    ("EK", "🇦🇪"),
    ("QR", "🇶🇦"),
    ("TK", "🇹🇷"),
    ("LH", "🇩🇪"),
    ("AF", "🇫🇷"),
    ("BA", "🇬🇧"),
    ("KL", "🇳🇱"),
    ("SQ", "🇸🇬"),
    ("CX", "🇭🇰"),
    ("JL", "🇯🇵"),
    ("NH", "🇯🇵"),
];
const GENERIC_LOGO: &str = "✈️";

const UNKNOWN_AIRLINE: &str = "Unknown Airline";
const PLACEHOLDER_BOOKING_URL: &str = "#";

// Pricing context of the search that produced the itineraries
#[derive(Debug, Clone)]
pub struct FareContext {
    pub currency: String,
    pub fare_type: CabinClass,
}

pub fn extract_first(record: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match record.pointer(path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn extract_field(record: &Value, field: AirportField) -> Option<String> {
    AIRPORT_RULES
        .iter()
        .find(|rule| rule.field == field)
        .and_then(|rule| extract_first(record, rule.paths))
}

pub fn has_usable_code(record: &Value) -> bool {
    extract_field(record, AirportField::Code).is_some()
}

pub fn normalize_airport(record: &Value) -> Airport {
    let code = extract_field(record, AirportField::Code).unwrap_or_default();
    let city = extract_field(record, AirportField::City).unwrap_or_default();
    let name = extract_field(record, AirportField::Name).unwrap_or_else(|| {
        if code.is_empty() {
            String::new()
        } else {
            format!("{} ({})", city, code)
        }
    });

    Airport {
        code,
        name,
        city,
        country: extract_field(record, AirportField::Country).unwrap_or_default(),
        entity_id: extract_field(record, AirportField::EntityId),
    }
}

// Airports with a usable code, capped at `limit`, tagged with `popular`.
pub fn normalize_airport_list(records: &[Value], limit: usize, popular: bool) -> Vec<PopularAirport> {
    records
        .iter()
        .filter(|record| has_usable_code(record))
        .take(limit)
        .map(|record| PopularAirport::new(normalize_airport(record), popular))
        .collect()
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

// Splits an ISO-8601 timestamp into `(YYYY-MM-DD, HH:MM)` in the zone it
// was written in. Unparseable input is split textually at the `T`.
pub fn split_timestamp(raw: &str) -> (String, String) {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return (dt.format("%Y-%m-%d").to_string(), dt.format("%H:%M").to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return (dt.format("%Y-%m-%d").to_string(), dt.format("%H:%M").to_string());
        }
    }

    match raw.split_once('T') {
        Some((date, time)) => (date.to_string(), time.chars().take(5).collect()),
        None => (raw.to_string(), String::new()),
    }
}

pub fn airline_logo(code: &str) -> &'static str {
    AIRLINE_LOGOS
        .iter()
        .find(|(carrier, _)| *carrier == code)
        .map(|(_, logo)| *logo)
        .unwrap_or(GENERIC_LOGO)
}

pub fn stop_details(stops: u32) -> Vec<String> {
    match stops {
        0 => Vec::new(),
        1 => vec!["1 stop".to_string()],
        n => vec![format!("{} stops", n)],
    }
}

fn endpoint(place: &Value, timestamp: &str) -> SegmentEndpoint {
    let (date, time) = split_timestamp(timestamp);
    SegmentEndpoint {
        airport: normalize_airport(place),
        time,
        date,
    }
}

pub fn normalize_segment(segment: &RawSegment) -> FlightSegment {
    FlightSegment {
        departure: endpoint(&segment.origin, &segment.departure),
        arrival: endpoint(&segment.destination, &segment.arrival),
        duration: format_duration(segment.duration_in_minutes),
        flight_number: format!(
            "{}{}",
            segment.marketing_carrier.display_code, segment.flight_number
        ),
        aircraft: segment.marketing_carrier.name.clone(),
    }
}

// Converts the outbound leg of an itinerary. Return legs are not modelled.
// Returns `None` when the itinerary has no leg or the leg has no segments.
pub fn normalize_itinerary(itinerary: &RawItinerary, fare: &FareContext) -> Option<Flight> {
    let leg = itinerary.legs.first()?;
    if leg.segments.is_empty() {
        return None;
    }

    let carrier = leg.carriers.marketing.first();
    let airline_name = carrier
        .map(|c| c.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_AIRLINE);
    let airline_code = carrier.map(|c| c.display_code.clone()).unwrap_or_default();

    Some(Flight {
        id: itinerary.id.clone(),
        airline: Airline {
            name: airline_name.to_string(),
            logo: airline_logo(&airline_code).to_string(),
            code: airline_code,
        },
        segments: leg.segments.iter().map(normalize_segment).collect(),
        price: Price {
            total: itinerary.price.raw,
            currency: fare.currency.clone(),
            formatted: itinerary.price.formatted.clone(),
        },
        duration: format_duration(leg.duration_in_minutes),
        stops: leg.stop_count,
        stop_details: stop_details(leg.stop_count),
        fare_type: fare.fare_type,
        booking_url: PLACEHOLDER_BOOKING_URL.to_string(),
        score: itinerary.score,
    })
}

// Keeps the first `limit` itineraries, converts them and orders the result by
// ascending total price. Itineraries that cannot be converted are dropped.
pub fn normalize_itineraries(
    itineraries: &[RawItinerary],
    limit: usize,
    fare: &FareContext,
) -> Vec<Flight> {
    let mut flights: Vec<Flight> = itineraries
        .iter()
        .take(limit)
        .filter_map(|itinerary| {
            let flight = normalize_itinerary(itinerary, fare);
            if flight.is_none() {
                warn!("Skipping itinerary {} without an outbound segment", itinerary.id);
            }
            flight
        })
        .collect();

    flights.sort_by(|a, b| a.price.total.total_cmp(&b.price.total));
    flights
}
