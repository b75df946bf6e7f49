use crate::classify::{classify, is_disrupted, status_label, velocity_kmh};
use crate::net::CycleOutcome;
use crate::regions::{find, Region};

/// Rendering bound on the disrupted-flights list. Entries past this
/// are dropped post-sort; there is no pagination.
pub const MAX_ENTRIES: usize = 50;

/// Terminal state of one rendered cycle. `UpstreamUnavailable` (every
/// region failed, typically network blocking or rate limiting) is kept
/// distinct from `NoDisruptions` (upstream answered, airspace quiet).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    /// No cycle has completed yet.
    #[default]
    Loading,
    Normal,
    NoDisruptions,
    UpstreamUnavailable,
    Error(String),
}

/// One row of the disrupted-flights list, carrying everything the
/// renderer needs without reaching back into raw records.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewEntry {
    pub region_key: String,
    pub region_name: String,
    pub callsign: String,
    pub origin_country: Option<String>,
    pub status: &'static str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_m: Option<f64>,
    pub velocity_kmh: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct ViewModel {
    pub state: ViewState,
    pub entries: Vec<ViewEntry>,
    /// Per-region flight counts in registry order; `None` means the
    /// region's fetch failed ("N/A").
    pub counts: Vec<(String, Option<usize>)>,
    pub api_time: Option<i64>,
}

/// Merges one cycle's per-region results into the rendered view:
/// classify, keep only disrupted records, sort by region key then
/// callsign, cap at [`MAX_ENTRIES`].
pub fn build_view(outcome: &CycleOutcome, regions: &[Region]) -> ViewModel {
    let all_failed = !outcome.regions.is_empty() && outcome.regions.iter().all(|r| r.failed);

    let counts = outcome
        .regions
        .iter()
        .map(|fetch| {
            let count = if fetch.failed {
                None
            } else {
                Some(fetch.states.len())
            };
            (fetch.region.clone(), count)
        })
        .collect();

    let mut entries: Vec<ViewEntry> = outcome
        .regions
        .iter()
        .flat_map(|fetch| {
            fetch
                .states
                .iter()
                .map(|sv| classify(sv, &fetch.region))
        })
        .filter(is_disrupted)
        .map(|record| {
            let region_name = find(regions, &record.region)
                .map(|region| region.name.clone())
                .unwrap_or_else(|| record.region.clone());
            ViewEntry {
                region_key: record.region.clone(),
                region_name,
                callsign: record.callsign.clone(),
                origin_country: record.origin_country.clone(),
                status: status_label(&record),
                latitude: record.latitude,
                longitude: record.longitude,
                altitude_m: record.altitude_m,
                velocity_kmh: velocity_kmh(&record),
            }
        })
        .collect();

    // Stable sort: ties keep their fetch order.
    entries.sort_by(|a, b| {
        a.region_key
            .cmp(&b.region_key)
            .then_with(|| a.callsign.cmp(&b.callsign))
    });
    entries.truncate(MAX_ENTRIES);

    let state = if all_failed {
        ViewState::UpstreamUnavailable
    } else if entries.is_empty() {
        ViewState::NoDisruptions
    } else {
        ViewState::Normal
    };

    ViewModel {
        state,
        entries,
        counts,
        api_time: outcome.api_time,
    }
}

pub fn fmt_altitude(altitude_m: Option<f64>) -> String {
    match altitude_m {
        Some(value) => format!("{}m", value.round() as i64),
        None => "N/A".to_string(),
    }
}

pub fn fmt_speed(velocity_kmh: Option<f64>) -> String {
    match velocity_kmh {
        Some(value) => format!("{}km/h", value.round() as i64),
        None => "N/A".to_string(),
    }
}

/// Two-decimal display rounding; the underlying value keeps full
/// precision.
pub fn fmt_coord(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => "--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_view, fmt_altitude, fmt_coord, fmt_speed, ViewState, MAX_ENTRIES};
    use crate::model::StateVector;
    use crate::net::{CycleOutcome, RegionFetch};
    use crate::regions::default_regions;
    use std::time::SystemTime;

    fn sv(
        callsign: &str,
        altitude_m: Option<f64>,
        velocity_mps: Option<f64>,
        on_ground: bool,
    ) -> StateVector {
        StateVector {
            callsign: Some(callsign.to_string()),
            origin_country: Some("Testland".to_string()),
            longitude: Some(35.0),
            latitude: Some(31.5),
            baro_altitude_m: altitude_m,
            on_ground: Some(on_ground),
            velocity_mps,
        }
    }

    fn fetched(region: &str, states: Vec<StateVector>) -> RegionFetch {
        RegionFetch {
            region: region.to_string(),
            states,
            failed: false,
            time: Some(1_769_903_354),
        }
    }

    fn failed(region: &str) -> RegionFetch {
        RegionFetch {
            region: region.to_string(),
            states: Vec::new(),
            failed: true,
            time: None,
        }
    }

    fn outcome(regions: Vec<RegionFetch>) -> CycleOutcome {
        let api_time = regions.iter().filter_map(|r| r.time).max();
        CycleOutcome {
            regions,
            api_time,
            finished: SystemTime::now(),
        }
    }

    #[test]
    fn disrupted_only_with_successful_region_counts() {
        // Region A has one grounded aircraft, region B one at cruise:
        // one rendered entry, B still counts as fetched.
        let regions = default_regions();
        let cycle = outcome(vec![
            fetched("israel", vec![sv("ELY1", Some(0.0), Some(2.0), true)]),
            // 10000 m at 69.4 m/s is 250 km/h, a normal cruise state.
            fetched("jordan", vec![sv("RJA2", Some(10000.0), Some(69.4), false)]),
        ]);
        let view = build_view(&cycle, &regions);
        assert_eq!(view.state, ViewState::Normal);
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].callsign, "ELY1");
        assert_eq!(view.entries[0].region_name, "Israel");
        assert_eq!(view.entries[0].status, "On Ground");
        assert_eq!(
            view.counts,
            vec![
                ("israel".to_string(), Some(1)),
                ("jordan".to_string(), Some(1)),
            ]
        );
    }

    #[test]
    fn sorted_by_region_key_then_callsign() {
        let regions = default_regions();
        let cycle = outcome(vec![
            fetched(
                "jordan",
                vec![
                    sv("ZZZ9", Some(100.0), Some(1.0), false),
                    sv("AAA1", Some(100.0), Some(1.0), false),
                ],
            ),
            fetched("iran", vec![sv("MMM5", None, None, true)]),
        ]);
        let view = build_view(&cycle, &regions);
        let order: Vec<(&str, &str)> = view
            .entries
            .iter()
            .map(|e| (e.region_key.as_str(), e.callsign.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("iran", "MMM5"), ("jordan", "AAA1"), ("jordan", "ZZZ9")]
        );
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let regions = default_regions();
        let mut first = sv("SAME1", Some(10.0), Some(1.0), false);
        first.origin_country = Some("First".to_string());
        let mut second = sv("SAME1", Some(20.0), Some(2.0), false);
        second.origin_country = Some("Second".to_string());
        let cycle = outcome(vec![fetched("iraq", vec![first, second])]);
        let view = build_view(&cycle, &regions);
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.entries[0].origin_country.as_deref(), Some("First"));
        assert_eq!(view.entries[1].origin_country.as_deref(), Some("Second"));
    }

    #[test]
    fn capped_at_max_entries() {
        let regions = default_regions();
        let states: Vec<StateVector> = (0..200)
            .map(|i| sv(&format!("FLT{i:03}"), Some(0.0), Some(0.0), true))
            .collect();
        let cycle = outcome(vec![fetched("israel", states)]);
        let view = build_view(&cycle, &regions);
        assert_eq!(view.entries.len(), MAX_ENTRIES);
    }

    #[test]
    fn all_failed_is_upstream_unavailable() {
        let regions = default_regions();
        let cycle = outcome(vec![failed("israel"), failed("jordan")]);
        let view = build_view(&cycle, &regions);
        assert_eq!(view.state, ViewState::UpstreamUnavailable);
        assert_eq!(
            view.counts,
            vec![("israel".to_string(), None), ("jordan".to_string(), None)]
        );
    }

    #[test]
    fn quiet_airspace_is_no_disruptions() {
        let regions = default_regions();
        let cycle = outcome(vec![
            fetched("israel", vec![sv("ELY9", Some(11000.0), Some(240.0), false)]),
            fetched("jordan", Vec::new()),
        ]);
        let view = build_view(&cycle, &regions);
        assert_eq!(view.state, ViewState::NoDisruptions);
        assert!(view.entries.is_empty());
    }

    #[test]
    fn partial_failure_stays_normal() {
        let regions = default_regions();
        let cycle = outcome(vec![
            failed("israel"),
            fetched("jordan", vec![sv("RJA1", None, None, false)]),
        ]);
        let view = build_view(&cycle, &regions);
        assert_eq!(view.state, ViewState::Normal);
        assert_eq!(view.counts[0].1, None);
        assert_eq!(view.counts[1].1, Some(1));
    }

    #[test]
    fn display_formatting() {
        assert_eq!(fmt_altitude(Some(1043.6)), "1044m");
        assert_eq!(fmt_altitude(None), "N/A");
        assert_eq!(fmt_speed(Some(49.4)), "49km/h");
        assert_eq!(fmt_speed(None), "N/A");
        assert_eq!(fmt_coord(Some(31.987654)), "31.99");
        assert_eq!(fmt_coord(None), "--");
    }
}
