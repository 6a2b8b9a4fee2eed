use crate::error::DataError;
use serde::Deserialize;
use std::path::Path;

/// One passenger row as it appears in the passenger information box.
/// Insertion order in the input array is display order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Passenger {
    pub name: String,
    pub id_number: String,
    pub nationality: String,
}

/// The flat JSON record describing a trip, its driver, and its passengers.
/// Loaded once per invocation and immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub date: String,
    pub from_city: String,
    pub to_city: String,
    pub visa_type: String,
    pub trip_number: String,
    pub main_passenger: String,
    pub driver_name: String,
    pub driver_id: String,
    pub license_number: String,
    pub passengers: Vec<Passenger>,
    /// Only used to pick a cosmetic template variant
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub vehicle_model: String,
}

/// Every string field that must be present and non-empty
const REQUIRED_FIELDS: &[&str] = &[
    "date",
    "from_city",
    "to_city",
    "visa_type",
    "trip_number",
    "main_passenger",
    "driver_name",
    "driver_id",
    "license_number",
];

const PASSENGER_FIELDS: &[&str] = &["name", "id_number", "nationality"];

/// Load and validate a trip record. No partial success: either a complete
/// record comes back or the whole load fails with a [DataError] naming the
/// offending field.
pub fn load_record(path: &Path) -> Result<TripRecord, DataError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_record(&raw)
}

/// Validate and deserialise a record from raw JSON text. Validation runs on
/// the JSON value first so errors name the field instead of a byte offset.
pub fn parse_record(raw: &str) -> Result<TripRecord, DataError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let object = value.as_object().ok_or_else(|| DataError::Malformed {
        field: "<root>".into(),
        reason: "record must be a JSON object".into(),
    })?;

    for &field in REQUIRED_FIELDS {
        match object.get(field) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {}
            Some(serde_json::Value::String(_)) | None => {
                return Err(DataError::MissingField(field.into()));
            }
            Some(_) => {
                return Err(DataError::Malformed {
                    field: field.into(),
                    reason: "expected a string".into(),
                });
            }
        }
    }

    let passengers = match object.get("passengers") {
        Some(serde_json::Value::Array(items)) => items,
        None => return Err(DataError::MissingField("passengers".into())),
        Some(_) => {
            return Err(DataError::Malformed {
                field: "passengers".into(),
                reason: "expected an array".into(),
            });
        }
    };
    for (index, passenger) in passengers.iter().enumerate() {
        let row = passenger.as_object().ok_or_else(|| DataError::Malformed {
            field: format!("passengers[{index}]"),
            reason: "expected an object".into(),
        })?;
        for &field in PASSENGER_FIELDS {
            match row.get(field) {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {}
                _ => {
                    return Err(DataError::MissingField(format!(
                        "passengers[{index}].{field}"
                    )));
                }
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}
