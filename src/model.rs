use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response body of the upstream `/states/all` query. The `states`
/// array is omitted entirely (or sent as null) when a bounding box is
/// empty, so both decode as an empty vector.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatesResponse {
    #[serde(default, deserialize_with = "de_opt_i64_from_any")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "de_states")]
    pub states: Vec<StateVector>,
}

// Upstream state vectors are heterogeneous positional tuples. The
// slots this tracker consumes:
//   1  callsign          string
//   2  origin country    string
//   5  longitude         deg
//   6  latitude          deg
//   7  baro altitude     m
//   8  on-ground flag    bool
//   9  velocity          m/s
const IDX_CALLSIGN: usize = 1;
const IDX_ORIGIN_COUNTRY: usize = 2;
const IDX_LONGITUDE: usize = 5;
const IDX_LATITUDE: usize = 6;
const IDX_BARO_ALTITUDE: usize = 7;
const IDX_ON_GROUND: usize = 8;
const IDX_VELOCITY: usize = 9;

/// Typed view of one positional state-vector tuple. Decoded once at
/// the wire boundary; every slot may be null, missing (short tuple) or
/// of an unexpected type, all of which read as `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateVector {
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude_m: Option<f64>,
    pub on_ground: Option<bool>,
    pub velocity_mps: Option<f64>,
}

impl StateVector {
    fn from_slots(slots: &[Value]) -> Self {
        Self {
            callsign: slot_str(slots, IDX_CALLSIGN),
            origin_country: slot_str(slots, IDX_ORIGIN_COUNTRY),
            longitude: slot_f64(slots, IDX_LONGITUDE),
            latitude: slot_f64(slots, IDX_LATITUDE),
            baro_altitude_m: slot_f64(slots, IDX_BARO_ALTITUDE),
            on_ground: slot_bool(slots, IDX_ON_GROUND),
            velocity_mps: slot_f64(slots, IDX_VELOCITY),
        }
    }
}

impl<'de> Deserialize<'de> for StateVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let slots = Vec::<Value>::deserialize(deserializer)?;
        Ok(StateVector::from_slots(&slots))
    }
}

fn slot_str(slots: &[Value], idx: usize) -> Option<String> {
    match slots.get(idx) {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    }
}

fn slot_f64(slots: &[Value], idx: usize) -> Option<f64> {
    match slots.get(idx) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn slot_bool(slots: &[Value], idx: usize) -> Option<bool> {
    match slots.get(idx) {
        Some(Value::Bool(flag)) => Some(*flag),
        _ => None,
    }
}

fn de_states<'de, D>(deserializer: D) -> Result<Vec<StateVector>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::Array(slots) => StateVector::from_slots(&slots),
                _ => StateVector::default(),
            })
            .collect()),
        other => Err(serde::de::Error::custom(format!(
            "expected array or null, got {other}"
        ))),
    }
}

fn de_opt_i64_from_any<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(Some(value))
            } else if let Some(value) = number.as_f64() {
                Ok(Some(value as i64))
            } else {
                Ok(None)
            }
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else if let Ok(value) = trimmed.parse::<i64>() {
                Ok(Some(value))
            } else if let Ok(value) = trimmed.parse::<f64>() {
                Ok(Some(value as i64))
            } else {
                Ok(None)
            }
        }
        Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "expected number or null, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::StatesResponse;

    const MOCK: &str = r#"{
        "time": 1769903354,
        "states": [
            ["4b1817", "SWR181  ", "Switzerland", 1769903330, 1769903354,
             35.1234, 31.9876, 10972.8, false, 236.5, 42.0, 0.0, null,
             11193.78, "1021", false, 0],
            ["738065", "ELY358", "Israel", 1769903340, 1769903354,
             34.88, 32.01, null, true, 4.63, 158.0, null, null,
             null, "4312", false, 0],
            ["900abc", null, "Jordan", null, 1769903354, null, null]
        ]
    }"#;

    #[test]
    fn decode_positional_tuples() {
        let data: StatesResponse = serde_json::from_str(MOCK).unwrap();
        assert_eq!(data.time, Some(1769903354));
        assert_eq!(data.states.len(), 3);

        let cruising = &data.states[0];
        assert_eq!(cruising.callsign.as_deref(), Some("SWR181  "));
        assert_eq!(cruising.origin_country.as_deref(), Some("Switzerland"));
        assert_eq!(cruising.longitude, Some(35.1234));
        assert_eq!(cruising.latitude, Some(31.9876));
        assert_eq!(cruising.baro_altitude_m, Some(10972.8));
        assert_eq!(cruising.on_ground, Some(false));
        assert_eq!(cruising.velocity_mps, Some(236.5));

        let grounded = &data.states[1];
        assert_eq!(grounded.baro_altitude_m, None);
        assert_eq!(grounded.on_ground, Some(true));
        assert_eq!(grounded.velocity_mps, Some(4.63));
    }

    #[test]
    fn short_tuple_reads_as_absent() {
        let data: StatesResponse = serde_json::from_str(MOCK).unwrap();
        let short = &data.states[2];
        assert_eq!(short.callsign, None);
        assert_eq!(short.origin_country.as_deref(), Some("Jordan"));
        assert_eq!(short.baro_altitude_m, None);
        assert_eq!(short.on_ground, None);
        assert_eq!(short.velocity_mps, None);
    }

    #[test]
    fn missing_or_null_states_decode_empty() {
        let absent: StatesResponse = serde_json::from_str(r#"{"time": 1}"#).unwrap();
        assert!(absent.states.is_empty());

        let null: StatesResponse =
            serde_json::from_str(r#"{"time": 1, "states": null}"#).unwrap();
        assert!(null.states.is_empty());
    }

    #[test]
    fn junk_typed_slots_read_as_absent() {
        let data: StatesResponse = serde_json::from_str(
            r#"{"time": "7", "states": [[0, 12345, "Iran", 0, 0, "44.5", true, {"x":1}, "yes", [1]]]}"#,
        )
        .unwrap();
        assert_eq!(data.time, Some(7));
        let sv = &data.states[0];
        assert_eq!(sv.callsign, None);
        assert_eq!(sv.longitude, Some(44.5));
        assert_eq!(sv.baro_altitude_m, None);
        assert_eq!(sv.on_ground, None);
        assert_eq!(sv.velocity_mps, None);
    }
}
