use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use ratatui::widgets::TableState;
use tracing::{error, info};

use crate::net::CycleOutcome;
use crate::notam::NotamStatus;
use crate::regions::Region;
use crate::view::{build_view, ViewEntry, ViewModel, ViewState};

/// All mutable application state, owned by the UI thread. The filter
/// set and the latest view are the only state carried between cycles;
/// flight data itself is rebuilt from scratch every fetch.
pub struct App {
    pub regions: Vec<Region>,
    pub view: ViewModel,
    /// Region keys currently shown. Always a subset of the registry
    /// keys; every region starts active.
    pub active_filters: HashSet<String>,
    /// Live per-region counts, updated as each region's fetch resolves
    /// (ahead of the cycle's aggregate). `None` renders as "N/A".
    pub counts: HashMap<String, Option<usize>>,
    pub notam: NotamStatus,
    pub last_update: Option<SystemTime>,
    pub paused: bool,
    pub table_state: TableState,
}

impl App {
    pub fn new(regions: Vec<Region>, notam: NotamStatus) -> Self {
        let active_filters = regions.iter().map(|region| region.key.clone()).collect();
        Self {
            regions,
            view: ViewModel::default(),
            active_filters,
            counts: HashMap::new(),
            notam,
            last_update: None,
            paused: false,
            table_state: TableState::default(),
        }
    }

    /// Replaces the rendered view with this cycle's aggregation.
    /// Overlapping cycles are not sequenced; the last delivery wins.
    pub fn apply_cycle(&mut self, outcome: CycleOutcome) {
        let view = build_view(&outcome, &self.regions);
        info!(
            "cycle applied: {} entries, state {:?}",
            view.entries.len(),
            view.state
        );
        for (key, count) in &view.counts {
            self.counts.insert(key.clone(), *count);
        }
        self.view = view;
        self.last_update = Some(outcome.finished);
        self.clamp_selection();
    }

    pub fn apply_region_count(&mut self, key: &str, count: Option<usize>) {
        self.counts.insert(key.to_string(), count);
    }

    /// Unexpected pipeline failure: flag the error state but keep the
    /// previous entries on screen.
    pub fn apply_fatal(&mut self, message: String) {
        error!("pipeline error: {message}");
        self.view.state = ViewState::Error(message);
    }

    /// Flips one region's visibility. Unknown keys are ignored, which
    /// keeps the active set a subset of the registry.
    pub fn toggle_region(&mut self, key: &str) {
        if !self.regions.iter().any(|region| region.key == key) {
            return;
        }
        if !self.active_filters.remove(key) {
            self.active_filters.insert(key.to_string());
        }
        self.clamp_selection();
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active_filters.contains(key)
    }

    /// Presentation-layer filtering: applied on every render, after
    /// aggregation. Toggling a filter never refetches or reclassifies.
    pub fn visible_entries(&self) -> Vec<&ViewEntry> {
        self.view
            .entries
            .iter()
            .filter(|entry| self.active_filters.contains(&entry.region_key))
            .collect()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn next_row(&mut self) {
        let len = self.visible_entries().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let next = match self.table_state.selected() {
            Some(row) if row + 1 < len => row + 1,
            Some(row) => row,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    pub fn previous_row(&mut self) {
        let len = self.visible_entries().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let previous = self.table_state.selected().map_or(0, |row| row.saturating_sub(1));
        self.table_state.select(Some(previous));
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_entries().len();
        match self.table_state.selected() {
            Some(_) if len == 0 => self.table_state.select(None),
            Some(row) if row >= len => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    /// Count cell for the overview strip: "N/A" after a failed fetch,
    /// "--" before the first one resolves.
    pub fn count_text(&self, key: &str) -> String {
        match self.counts.get(key) {
            Some(Some(count)) => count.to_string(),
            Some(None) => "N/A".to_string(),
            None => "--".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::model::StateVector;
    use crate::net::{CycleOutcome, RegionFetch};
    use crate::notam::NotamStatus;
    use crate::regions::default_regions;
    use crate::view::ViewState;
    use std::time::SystemTime;

    fn grounded(callsign: &str) -> StateVector {
        StateVector {
            callsign: Some(callsign.to_string()),
            on_ground: Some(true),
            ..StateVector::default()
        }
    }

    fn cycle(regions: Vec<RegionFetch>) -> CycleOutcome {
        CycleOutcome {
            regions,
            api_time: None,
            finished: SystemTime::now(),
        }
    }

    fn app_with_two_regions() -> App {
        let mut app = App::new(default_regions(), NotamStatus::Unconfigured);
        app.apply_cycle(cycle(vec![
            RegionFetch {
                region: "israel".to_string(),
                states: vec![grounded("ELY1"), grounded("ELY2")],
                failed: false,
                time: None,
            },
            RegionFetch {
                region: "jordan".to_string(),
                states: vec![grounded("RJA1")],
                failed: false,
                time: None,
            },
        ]));
        app
    }

    #[test]
    fn all_regions_start_active() {
        let app = App::new(default_regions(), NotamStatus::Unconfigured);
        for region in &app.regions {
            assert!(app.is_active(&region.key));
        }
    }

    #[test]
    fn toggling_hides_without_rebuilding() {
        let mut app = app_with_two_regions();
        assert_eq!(app.visible_entries().len(), 3);

        app.toggle_region("israel");
        // The aggregated view is untouched; only visibility changed.
        assert_eq!(app.view.entries.len(), 3);
        let visible = app.visible_entries();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].callsign, "RJA1");

        app.toggle_region("israel");
        assert_eq!(app.visible_entries().len(), 3);
    }

    #[test]
    fn unknown_key_toggle_is_ignored() {
        let mut app = app_with_two_regions();
        app.toggle_region("atlantis");
        assert_eq!(app.active_filters.len(), app.regions.len());
        assert!(!app.is_active("atlantis"));
    }

    #[test]
    fn counts_track_region_resolutions() {
        let mut app = App::new(default_regions(), NotamStatus::Unconfigured);
        assert_eq!(app.count_text("israel"), "--");
        app.apply_region_count("israel", Some(12));
        app.apply_region_count("jordan", None);
        assert_eq!(app.count_text("israel"), "12");
        assert_eq!(app.count_text("jordan"), "N/A");
    }

    #[test]
    fn fatal_keeps_previous_entries() {
        let mut app = app_with_two_regions();
        app.apply_fatal("boom".to_string());
        assert_eq!(app.view.state, ViewState::Error("boom".to_string()));
        assert_eq!(app.view.entries.len(), 3);
    }

    #[test]
    fn selection_clamps_to_visible_rows() {
        let mut app = app_with_two_regions();
        app.next_row();
        app.next_row();
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(2));
        app.toggle_region("israel");
        assert_eq!(app.table_state.selected(), Some(0));
        app.toggle_region("jordan");
        assert_eq!(app.table_state.selected(), None);
    }
}
