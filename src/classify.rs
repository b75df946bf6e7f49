use crate::model::StateVector;

/// Below this barometric altitude a flight is considered to be in the
/// airport vicinity rather than at cruise.
pub const LOW_ALTITUDE_M: f64 = 1000.0;
/// Below this ground speed a flight is considered to be taxiing,
/// holding or otherwise not in normal flight.
pub const LOW_SPEED_KMH: f64 = 50.0;

const MPS_TO_KMH: f64 = 3.6;

/// One aircraft position tied to the region whose bounding box it was
/// fetched for. Built fresh every cycle; nothing is carried across
/// cycles and no identity is tracked between them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlightRecord {
    pub region: String,
    pub callsign: String,
    pub origin_country: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude_m: Option<f64>,
    pub velocity_mps: Option<f64>,
    pub on_ground: Option<bool>,
}

pub fn classify(sv: &StateVector, region_key: &str) -> FlightRecord {
    let callsign = sv
        .callsign
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    FlightRecord {
        region: region_key.to_string(),
        callsign,
        origin_country: sv.origin_country.clone(),
        longitude: sv.longitude,
        latitude: sv.latitude,
        altitude_m: sv.baro_altitude_m,
        velocity_mps: sv.velocity_mps,
        on_ground: sv.on_ground,
    }
}

pub fn velocity_kmh(record: &FlightRecord) -> Option<f64> {
    record.velocity_mps.map(|mps| mps * MPS_TO_KMH)
}

/// Disruption heuristic: on the ground, below [`LOW_ALTITUDE_M`], or
/// slower than [`LOW_SPEED_KMH`]. Any one condition suffices.
///
/// Default-to-zero rule: absent altitude or velocity is treated as 0
/// here, so a record with no altitude and no velocity data always
/// classifies as disrupted. Inherited from the original tracker and
/// kept as documented behaviour.
///
/// Pure function of this record's own fields; never looks at other
/// records or at the active filters.
pub fn is_disrupted(record: &FlightRecord) -> bool {
    record.on_ground == Some(true)
        || record.altitude_m.unwrap_or(0.0) < LOW_ALTITUDE_M
        || velocity_kmh(record).unwrap_or(0.0) < LOW_SPEED_KMH
}

pub fn status_label(record: &FlightRecord) -> &'static str {
    if record.on_ground == Some(true) {
        "On Ground"
    } else {
        "Low Altitude/Speed"
    }
}
