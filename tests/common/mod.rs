// Shared fixtures for integration tests

#![allow(dead_code)]

use station_locator::StationApiClient;
use std::time::Duration;

pub fn station_json(id: &str, lat: &str, lon: &str) -> String {
    format!(
        r#"{{
            "stationId": "{id}",
            "name": "Station {id}",
            "services": ["fuel", "ev-charging"],
            "address": {{
                "streetLine1": "1 Avenue de l'Opera",
                "streetLine2": null,
                "streetLine3": null,
                "city": "Paris",
                "state": "Ile-de-France",
                "postalCode": "75001",
                "country": "FR",
                "latitude": "{lat}",
                "longitude": "{lon}"
            }}
        }}"#
    )
}

pub fn envelope(stations: &[String]) -> String {
    format!(r#"{{"results": [{}], "totalItems": {}}}"#, stations.join(","), stations.len())
}

pub fn client(base_url: &str) -> StationApiClient {
    StationApiClient::new(
        base_url.to_string(),
        "/search/stations".to_string(),
        Duration::from_secs(5),
    )
    .expect("client")
}
