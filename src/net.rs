use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, SystemTime};

use tracing::{debug, error, info, warn};

use crate::model::{StateVector, StatesResponse};
use crate::regions::{BoundingBox, Region};

/// What one region's fetch produced this cycle. A failed region is a
/// normal outcome: zero records plus the failed flag, never an error
/// surfaced to the caller.
#[derive(Clone, Debug)]
pub struct RegionFetch {
    pub region: String,
    pub states: Vec<StateVector>,
    pub failed: bool,
    pub time: Option<i64>,
}

/// All per-region results of one fetch cycle, in registry order.
#[derive(Clone, Debug)]
pub struct CycleOutcome {
    pub regions: Vec<RegionFetch>,
    pub api_time: Option<i64>,
    pub finished: SystemTime,
}

#[derive(Debug)]
pub enum FetchMessage {
    /// Sent as soon as a single region's request resolves, before the
    /// cycle as a whole completes. `None` renders as "N/A".
    RegionCount { key: String, count: Option<usize> },
    Cycle(CycleOutcome),
    Fatal(String),
}

/// Scheduler control, driven by the UI thread. Focus loss/regain maps
/// to Pause/Resume; a manual refresh runs one cycle immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerCommand {
    Refresh,
    Pause,
    Resume,
}

/// Spawns the background fetcher. The thread owns the refresh
/// scheduler: Running cycles every `interval`, Paused blocks until
/// resumed; resume and startup both issue an immediate cycle.
pub fn spawn_fetcher(
    regions: Vec<Region>,
    api_base: String,
    interval: Duration,
    timeout: Duration,
    credentials: Option<(String, String)>,
    tx: Sender<FetchMessage>,
    ctrl_rx: Receiver<SchedulerCommand>,
) {
    thread::spawn(move || {
        info!("fetcher started, {} regions", regions.len());
        let client = match reqwest::blocking::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => {
                error!("client error: {err}");
                let _ = tx.send(FetchMessage::Fatal(format!("Client error: {err}")));
                return;
            }
        };

        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };

        let mut paused = false;
        let mut run_now = true;
        loop {
            if paused {
                match ctrl_rx.recv() {
                    Ok(SchedulerCommand::Resume) => {
                        debug!("scheduler resumed");
                        paused = false;
                        run_now = true;
                    }
                    Ok(SchedulerCommand::Refresh) => {
                        run_cycle(&client, &api_base, &regions, credentials.as_ref(), &tx);
                    }
                    Ok(SchedulerCommand::Pause) => {}
                    Err(_) => {
                        debug!("controller dropped, exiting fetcher");
                        break;
                    }
                }
                continue;
            }

            if run_now {
                run_cycle(&client, &api_base, &regions, credentials.as_ref(), &tx);
                run_now = false;
            }

            match ctrl_rx.recv_timeout(interval) {
                Ok(SchedulerCommand::Refresh) => run_now = true,
                Ok(SchedulerCommand::Pause) => {
                    debug!("scheduler paused");
                    paused = true;
                }
                Ok(SchedulerCommand::Resume) => {}
                Err(RecvTimeoutError::Timeout) => run_now = true,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("controller dropped, exiting fetcher");
                    break;
                }
            }
        }
    });
}

/// One fetch cycle: fan out a request per region, fan in over the full
/// set. A failed or slow region never blocks another's request, but the
/// cycle's aggregate message waits for all of them.
fn run_cycle(
    client: &reqwest::blocking::Client,
    api_base: &str,
    regions: &[Region],
    credentials: Option<&(String, String)>,
    tx: &Sender<FetchMessage>,
) {
    debug!("fetch cycle started");
    let mut handles = Vec::with_capacity(regions.len());
    for region in regions {
        let client = client.clone();
        let url = states_url(api_base, &region.bounds);
        let key = region.key.clone();
        let credentials = credentials.cloned();
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            let outcome = fetch_region(&client, &url, credentials.as_ref());
            let count = match &outcome {
                Ok(resp) => Some(resp.states.len()),
                Err(_) => None,
            };
            let _ = tx.send(FetchMessage::RegionCount {
                key: key.clone(),
                count,
            });
            match outcome {
                Ok(resp) => RegionFetch {
                    region: key,
                    states: resp.states,
                    failed: false,
                    time: resp.time,
                },
                Err(err) => {
                    warn!("fetch failed for {key}: {err}");
                    RegionFetch {
                        region: key,
                        states: Vec::new(),
                        failed: true,
                        time: None,
                    }
                }
            }
        }));
    }

    let mut results = Vec::with_capacity(regions.len());
    for (region, handle) in regions.iter().zip(handles) {
        match handle.join() {
            Ok(fetch) => results.push(fetch),
            Err(_) => {
                error!("fetch worker panicked for {}", region.key);
                let _ = tx.send(FetchMessage::RegionCount {
                    key: region.key.clone(),
                    count: None,
                });
                results.push(RegionFetch {
                    region: region.key.clone(),
                    states: Vec::new(),
                    failed: true,
                    time: None,
                });
            }
        }
    }

    let total: usize = results.iter().map(|r| r.states.len()).sum();
    debug!("fetch cycle finished, {total} state vectors");
    let api_time = results.iter().filter_map(|r| r.time).max();
    let outcome = CycleOutcome {
        regions: results,
        api_time,
        finished: SystemTime::now(),
    };
    if tx.send(FetchMessage::Cycle(outcome)).is_err() {
        debug!("receiver dropped");
    }
}

fn states_url(api_base: &str, bounds: &BoundingBox) -> String {
    format!(
        "{}/states/all?lamin={}&lomin={}&lamax={}&lomax={}",
        api_base.trim_end_matches('/'),
        bounds.min_lat,
        bounds.min_lon,
        bounds.max_lat,
        bounds.max_lon
    )
}

fn fetch_region(
    client: &reqwest::blocking::Client,
    url: &str,
    credentials: Option<&(String, String)>,
) -> Result<StatesResponse, String> {
    let mut req = client.get(url);
    if let Some((username, password)) = credentials {
        req = req.basic_auth(username, Some(password));
    }
    let resp = req.send().map_err(|err| err.to_string())?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("HTTP {status}"));
    }
    resp.json::<StatesResponse>().map_err(|err| err.to_string())
}
