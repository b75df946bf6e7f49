/// Rectangular latitude/longitude window used to scope an upstream
/// position query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// One monitored airspace. The registry is fixed at startup; keys are
/// stable for the lifetime of the process.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub key: String,
    pub name: String,
    pub icao: String,
    pub bounds: BoundingBox,
}

impl Region {
    fn new(key: &str, name: &str, icao: &str, bounds: BoundingBox) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            icao: icao.to_string(),
            bounds,
        }
    }
}

/// The four airspaces monitored out of the box, in display order.
pub fn default_regions() -> Vec<Region> {
    vec![
        Region::new(
            "israel",
            "Israel",
            "LLLL",
            BoundingBox {
                min_lat: 29.5,
                max_lat: 33.3,
                min_lon: 34.3,
                max_lon: 35.9,
            },
        ),
        Region::new(
            "jordan",
            "Jordan",
            "OJAM",
            BoundingBox {
                min_lat: 29.2,
                max_lat: 33.4,
                min_lon: 34.9,
                max_lon: 39.3,
            },
        ),
        Region::new(
            "iraq",
            "Iraq",
            "ORBI",
            BoundingBox {
                min_lat: 29.1,
                max_lat: 37.4,
                min_lon: 38.8,
                max_lon: 48.6,
            },
        ),
        Region::new(
            "iran",
            "Iran",
            "OIIX",
            BoundingBox {
                min_lat: 25.1,
                max_lat: 39.8,
                min_lon: 44.0,
                max_lon: 63.3,
            },
        ),
    ]
}

pub fn find<'a>(regions: &'a [Region], key: &str) -> Option<&'a Region> {
    regions.iter().find(|region| region.key == key)
}
