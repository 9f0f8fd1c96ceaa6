// Command-line front end for the flight API client.
//
//   flight_search airports <query>
//   flight_search nearby [<lat> <lng>]
//   flight_search flights <ORIGIN> <DESTINATION> <YYYY-MM-DD> [<RETURN YYYY-MM-DD>]
//   flight_search popular
//   flight_search status

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use skyfare::{Airport, ClientConfig, FlightApi, FlightApiClient, FlightSearchRequest};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: flight_search <airports QUERY | nearby [LAT LNG] | flights ORIGIN DESTINATION DATE [RETURN] | popular | status>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = ClientConfig::from_env().context("loading configuration")?;
    let client = FlightApiClient::from_config(config).context("building API client")?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["airports", query @ ..] if !query.is_empty() => {
            print_json(&client.search_airports(&query.join(" ")).await)?
        }
        ["nearby"] => print_json(&client.get_nearby_airports(None, None).await)?,
        ["nearby", lat, lng] => {
            let lat: f64 = lat.parse().context("latitude")?;
            let lng: f64 = lng.parse().context("longitude")?;
            print_json(&client.get_nearby_airports(Some(lat), Some(lng)).await)?
        }
        ["flights", origin, destination, date, rest @ ..] if rest.len() <= 1 => {
            let request = build_request(origin, destination, date, rest.first().copied())?;
            match client.search_flights(request).await {
                Ok(response) => print_json(&response)?,
                Err(e) => bail!("{}", e.user_message()),
            }
        }
        ["popular"] => print_json(&client.popular_airports())?,
        ["status"] => print_json(&client.check_server_status().await)?,
        _ => return Err(anyhow!(USAGE)),
    }

    let stats = client.api_stats();
    info!(
        "API usage: {} requests, {} remaining, {} cached",
        stats.request_count, stats.remaining_requests, stats.cache_size
    );
    Ok(())
}

fn build_request(
    origin: &str,
    destination: &str,
    date: &str,
    return_date: Option<&str>,
) -> Result<FlightSearchRequest> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date {}", raw))
    };
    let airport = |code: &str| Airport {
        code: code.to_uppercase(),
        ..Default::default()
    };

    let origin = airport(origin);
    let destination = airport(destination);
    let date = parse(date)?;
    Ok(match return_date {
        Some(raw) => FlightSearchRequest::round_trip(&origin, &destination, date, parse(raw)?),
        None => FlightSearchRequest::one_way(&origin, &destination, date),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
