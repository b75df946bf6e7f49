//! NOTAM placeholder. Every real NOTAM source requires registered
//! credentials, and the feed integration itself is not built yet, so
//! this module only reports which of the two advisory states applies.
//! Synthetic NOTAM data is deliberately never generated.

/// Terminal, non-retryable per cycle. `Unconfigured` is an expected
/// configuration state, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotamStatus {
    Unconfigured,
    NotImplemented,
}

impl NotamStatus {
    pub fn from_key(notam_api_key: &str) -> Self {
        if notam_api_key.trim().is_empty() {
            NotamStatus::Unconfigured
        } else {
            NotamStatus::NotImplemented
        }
    }

    pub fn advisory(self) -> &'static str {
        match self {
            NotamStatus::Unconfigured => {
                "NOTAM data unavailable: no authenticated NOTAM source configured. \
                 Obtain API credentials from an official aviation authority and set \
                 notam_api_key in the config file. Do not use this tracker for \
                 operational decisions; always consult official sources for current NOTAMs."
            }
            NotamStatus::NotImplemented => {
                "NOTAM API integration not yet implemented. A key is configured but \
                 the fetching logic for the authority's endpoint is still missing."
            }
        }
    }
}

pub struct Airport {
    pub icao: &'static str,
    pub iata: &'static str,
    pub name: &'static str,
    pub city: &'static str,
}

/// Airports of the monitored countries, keyed by ICAO designator.
pub const AIRPORTS: &[Airport] = &[
    Airport { icao: "LLBG", iata: "TLV", name: "Ben Gurion International Airport", city: "Tel Aviv" },
    Airport { icao: "LLOV", iata: "VDA", name: "Ovda Airport", city: "Ovda" },
    Airport { icao: "LLER", iata: "ETH", name: "Eilat Airport", city: "Eilat" },
    Airport { icao: "LLHA", iata: "HFA", name: "Haifa Airport", city: "Haifa" },
    Airport { icao: "LLSD", iata: "SDV", name: "Sde Dov Airport", city: "Tel Aviv" },
    Airport { icao: "OJAI", iata: "AMM", name: "Queen Alia International Airport", city: "Amman" },
    Airport { icao: "OJAM", iata: "ADJ", name: "Marka International Airport", city: "Amman" },
    Airport { icao: "OJAQ", iata: "AQJ", name: "King Hussein International Airport", city: "Aqaba" },
    Airport { icao: "ORBI", iata: "BGW", name: "Baghdad International Airport", city: "Baghdad" },
    Airport { icao: "ORBB", iata: "BSR", name: "Basra International Airport", city: "Basra" },
    Airport { icao: "ORMM", iata: "EBL", name: "Erbil International Airport", city: "Erbil" },
    Airport { icao: "ORBM", iata: "OSM", name: "Mosul International Airport", city: "Mosul" },
    Airport { icao: "ORSU", iata: "ISU", name: "Sulaymaniyah International Airport", city: "Sulaymaniyah" },
    Airport { icao: "OIII", iata: "IKA", name: "Imam Khomeini International Airport", city: "Tehran" },
    Airport { icao: "OIIE", iata: "THR", name: "Mehrabad International Airport", city: "Tehran" },
    Airport { icao: "OISS", iata: "SYZ", name: "Shiraz International Airport", city: "Shiraz" },
    Airport { icao: "OIAW", iata: "AWZ", name: "Ahvaz International Airport", city: "Ahvaz" },
    Airport { icao: "OIMM", iata: "KSH", name: "Shahid Ashrafi Esfahani Airport", city: "Kermanshah" },
    Airport { icao: "OIKB", iata: "BND", name: "Bandar Abbas International Airport", city: "Bandar Abbas" },
    Airport { icao: "OICC", iata: "KER", name: "Kerman Airport", city: "Kerman" },
    Airport { icao: "OIFM", iata: "IFN", name: "Isfahan International Airport", city: "Isfahan" },
    Airport { icao: "OITT", iata: "TBZ", name: "Tabriz International Airport", city: "Tabriz" },
    Airport { icao: "OIMJ", iata: "MHD", name: "Mashhad International Airport", city: "Mashhad" },
];

/// Matches 4-letter ICAO and 3-letter IATA codes in free text against
/// the airport table, deduplicated by ICAO in order of appearance.
/// Not wired into the pipeline yet; kept for the NOTAM feed
/// integration.
#[allow(dead_code)]
pub fn extract_airport_codes(text: &str) -> Vec<&'static Airport> {
    let mut found: Vec<&'static Airport> = Vec::new();
    for word in uppercase_words(text) {
        let airport = match word.len() {
            4 => AIRPORTS.iter().find(|airport| airport.icao == word),
            3 => AIRPORTS.iter().find(|airport| airport.iata == word),
            _ => None,
        };
        if let Some(airport) = airport {
            if !found.iter().any(|seen| seen.icao == airport.icao) {
                found.push(airport);
            }
        }
    }
    found
}

/// Maximal runs of ASCII uppercase letters, bounded by any other
/// character.
fn uppercase_words(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut words = Vec::new();
    let mut start = None;
    for (i, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_uppercase() {
            start.get_or_insert(i);
        } else if let Some(begin) = start.take() {
            words.push(&text[begin..i]);
        }
    }
    if let Some(begin) = start {
        words.push(&text[begin..]);
    }
    words
}
