use std::collections::HashMap;

use crate::{BeerError, BeerResult, RequestParams};

pub const STRING_PARAMS: [&str; 3] = ["country", "city", "state"];
pub const UINT_PARAMS: [&str; 3] = ["attendees", "pack_units", "forecast_days"];

/// Message used when the raw query string cannot be decoded into key/value pairs at all.
pub const UNREADABLE_QUERY: &str = "could not read query params";

fn required<'a>(query: &'a HashMap<String, String>, name: &str) -> BeerResult<&'a str> {
    query
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BeerError::bad_request(format!("param {name} must not be empty")))
}

fn required_uint(query: &HashMap<String, String>, name: &str) -> BeerResult<u64> {
    required(query, name)?
        .parse::<u64>()
        .map_err(|_| BeerError::bad_request(format!("param {name} must be an integer value")))
}

/// Validates raw query parameters. String fields are checked before numeric ones and the
/// first failure wins.
pub fn parse_query(query: &HashMap<String, String>) -> BeerResult<RequestParams> {
    let [country, city, state] = STRING_PARAMS;
    let country = required(query, country)?;
    let city = required(query, city)?;
    let state = required(query, state)?;

    let [attendees, pack_units, forecast_days] = UINT_PARAMS;
    let attendees = required_uint(query, attendees)?;
    let pack_units = required_uint(query, pack_units)?;
    let forecast_days = required_uint(query, forecast_days)?;

    Ok(RequestParams {
        country: country.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        attendees,
        pack_units,
        forecast_days,
    })
}

impl TryFrom<&HashMap<String, String>> for RequestParams {
    type Error = BeerError;

    fn try_from(query: &HashMap<String, String>) -> Result<Self, Self::Error> {
        parse_query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_query() -> HashMap<String, String> {
        [
            ("country", "Argentina"),
            ("city", "BuenosAires"),
            ("state", "BA"),
            ("attendees", "50"),
            ("pack_units", "6"),
            ("forecast_days", "3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn message(err: BeerError) -> String {
        match err {
            BeerError::BadRequest(msg) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_complete_query() {
        let params = RequestParams::try_from(&valid_query()).unwrap();

        assert_eq!(
            params,
            RequestParams {
                country: "Argentina".into(),
                city: "BuenosAires".into(),
                state: "BA".into(),
                attendees: 50,
                pack_units: 6,
                forecast_days: 3,
            }
        );
    }

    #[test]
    fn each_missing_field_is_named() {
        for name in STRING_PARAMS.iter().chain(UINT_PARAMS.iter()) {
            let mut query = valid_query();
            query.remove(*name);

            let msg = message(parse_query(&query).unwrap_err());
            assert_eq!(msg, format!("param {name} must not be empty"));
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut query = valid_query();
        query.insert("pack_units".into(), String::new());

        let msg = message(parse_query(&query).unwrap_err());
        assert_eq!(msg, "param pack_units must not be empty");
    }

    #[test]
    fn non_integer_numbers_are_rejected() {
        for (name, value) in [("attendees", "abc"), ("pack_units", "-6"), ("forecast_days", "2.5")] {
            let mut query = valid_query();
            query.insert(name.into(), value.into());

            let msg = message(parse_query(&query).unwrap_err());
            assert_eq!(msg, format!("param {name} must be an integer value"));
        }
    }

    #[test]
    fn string_errors_surface_before_numeric_errors() {
        let mut query = valid_query();
        query.insert("attendees".into(), "abc".into());
        query.remove("state");

        let msg = message(parse_query(&query).unwrap_err());
        assert_eq!(msg, "param state must not be empty");
    }

    #[test]
    fn first_failure_in_declared_order_wins() {
        let mut query = valid_query();
        query.remove("city");
        query.remove("country");

        let msg = message(parse_query(&query).unwrap_err());
        assert!(msg.contains("country"));
    }

    #[test]
    fn zero_is_a_valid_integer() {
        let mut query = valid_query();
        query.insert("attendees".into(), "0".into());

        assert_eq!(parse_query(&query).unwrap().attendees, 0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut query = valid_query();
        query.insert("utm_source".into(), "newsletter".into());

        assert!(parse_query(&query).is_ok());
    }
}
