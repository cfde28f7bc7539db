//! Reactive binding between the two dashboard controls and the two charts.
//!
//! A [`Session`] owns one user's control values. Changing a control
//! recomputes exactly the outputs that depend on it. Every recompute is a
//! pure function of the current values, and each output carries a revision
//! number so a client can drop a render that arrives after a newer one.
//!
//! [`SessionStore`] keeps sessions apart; only the dataset is shared.

use crate::charts::{compute_pie_chart, compute_scatter_chart, ChartSpec};
use crate::data::Dataset;
use crate::filter::{PayloadRange, SiteSelector};
use crate::layout::{PAYLOAD_SLIDER_ID, PIE_CHART_ID, SCATTER_CHART_ID, SITE_DROPDOWN_ID};
use crate::logging::{log, log_chart_update, obj, v_str, Domain, Level, ProfileScope};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    SiteDropdown,
    PayloadSlider,
}

impl ControlId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::SiteDropdown => SITE_DROPDOWN_ID,
            ControlId::PayloadSlider => PAYLOAD_SLIDER_ID,
        }
    }
}

impl FromStr for ControlId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            SITE_DROPDOWN_ID => Ok(ControlId::SiteDropdown),
            PAYLOAD_SLIDER_ID => Ok(ControlId::PayloadSlider),
            other => Err(format!("unknown control `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputId {
    #[serde(rename = "success-pie-chart")]
    SuccessPieChart,
    #[serde(rename = "success-payload-scatter-chart")]
    SuccessPayloadScatterChart,
}

impl OutputId {
    pub const ALL: [OutputId; 2] = [OutputId::SuccessPieChart, OutputId::SuccessPayloadScatterChart];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputId::SuccessPieChart => PIE_CHART_ID,
            OutputId::SuccessPayloadScatterChart => SCATTER_CHART_ID,
        }
    }

    /// Controls this output is recomputed for.
    pub fn depends_on(&self) -> &'static [ControlId] {
        match self {
            OutputId::SuccessPieChart => &[ControlId::SiteDropdown],
            OutputId::SuccessPayloadScatterChart => &[ControlId::SiteDropdown, ControlId::PayloadSlider],
        }
    }

    fn index(&self) -> usize {
        match self {
            OutputId::SuccessPieChart => 0,
            OutputId::SuccessPayloadScatterChart => 1,
        }
    }
}

/// A new value for one control.
#[derive(Debug, Clone, PartialEq)]
pub enum InputChange {
    Site(SiteSelector),
    Payload(PayloadRange),
}

impl InputChange {
    pub fn control(&self) -> ControlId {
        match self {
            InputChange::Site(_) => ControlId::SiteDropdown,
            InputChange::Payload(_) => ControlId::PayloadSlider,
        }
    }

    /// Decode a `{control, value}` pair as sent by the page.
    pub fn decode(control: &str, value: Value) -> Result<Self, String> {
        match ControlId::from_str(control)? {
            ControlId::SiteDropdown => serde_json::from_value::<String>(value)
                .map(|s| InputChange::Site(SiteSelector::from(s)))
                .map_err(|e| format!("site_dropdown expects a string: {}", e)),
            ControlId::PayloadSlider => serde_json::from_value::<PayloadRange>(value)
                .map(InputChange::Payload)
                .map_err(|e| format!("payload_slider expects [low, high]: {}", e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartUpdate {
    pub output: OutputId,
    pub revision: u64,
    pub chart: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub site_selection: SiteSelector,
    pub payload_range: PayloadRange,
}

#[derive(Debug, Clone)]
pub struct Session {
    site_selection: SiteSelector,
    payload_range: PayloadRange,
    revisions: [u64; 2],
}

impl Session {
    /// Initial cells: "All Sites" and the dataset's full payload span.
    pub fn new(dataset: &Dataset) -> Self {
        let (min, max) = dataset.payload_bounds();
        Self {
            site_selection: SiteSelector::AllSites,
            payload_range: PayloadRange::clamped(min, max),
            revisions: [0; 2],
        }
    }

    pub fn site_selection(&self) -> &SiteSelector {
        &self.site_selection
    }

    pub fn payload_range(&self) -> PayloadRange {
        self.payload_range
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            site_selection: self.site_selection.clone(),
            payload_range: self.payload_range,
        }
    }

    /// Chart for `output` from the current cell values, without bumping its revision.
    pub fn chart(&self, dataset: &Dataset, output: OutputId) -> ChartSpec {
        let _scope = ProfileScope::with_context("chart", &[("output", v_str(output.as_str()))]);
        match output {
            OutputId::SuccessPieChart => compute_pie_chart(dataset, &self.site_selection),
            OutputId::SuccessPayloadScatterChart => {
                compute_scatter_chart(dataset, &self.site_selection, &self.payload_range)
            }
        }
    }

    fn render(&mut self, dataset: &Dataset, output: OutputId) -> ChartUpdate {
        let chart = self.chart(dataset, output);
        let slot = &mut self.revisions[output.index()];
        *slot += 1;
        ChartUpdate {
            output,
            revision: *slot,
            chart,
        }
    }

    /// Render every output, as on first page load.
    pub fn render_all(&mut self, dataset: &Dataset) -> Vec<ChartUpdate> {
        OutputId::ALL.iter().map(|o| self.render(dataset, *o)).collect()
    }

    /// Store the new control value and recompute the outputs bound to it.
    pub fn apply(&mut self, dataset: &Dataset, change: InputChange) -> Vec<ChartUpdate> {
        let control = change.control();
        match change {
            InputChange::Site(sel) => self.site_selection = sel,
            InputChange::Payload(range) => self.payload_range = range,
        }
        OutputId::ALL
            .iter()
            .filter(|o| o.depends_on().contains(&control))
            .map(|o| self.render(dataset, *o))
            .collect()
    }
}

struct Entry {
    session: Session,
    last_seen: Instant,
    // Logical clock for LRU eviction; Instants can tie.
    touched: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Mark a live session as used. An entry idle for `ttl` or longer is
    /// dropped here and reads as missing.
    fn touch(&mut self, id: &str, ttl: Duration) -> Option<&mut Entry> {
        let now = Instant::now();
        let idle = now.duration_since(self.entries.get(id)?.last_seen);
        if idle >= ttl {
            self.entries.remove(id);
            log(
                Level::Info,
                Domain::Session,
                "session_expired",
                obj(&[("session_id", v_str(id)), ("idle_ms", json!(idle.as_millis() as u64))]),
            );
            return None;
        }
        let tick = self.tick();
        let entry = self.entries.get_mut(id)?;
        entry.last_seen = now;
        entry.touched = tick;
        Some(entry)
    }
}

/// Session-local control state, keyed by an opaque random id.
pub struct SessionStore {
    inner: Mutex<Sessions>,
    ttl: Duration,
    max_sessions: usize,
}

fn new_session_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(Sessions::default()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sessions currently held, expired ones included until they are next pruned.
    pub fn active_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Open a session and return its id with the initial render of both outputs.
    pub fn create(&self, dataset: &Dataset) -> (String, Vec<ChartUpdate>) {
        let mut sessions = self.lock();
        let now = Instant::now();
        let ttl = self.ttl;
        let before = sessions.entries.len();
        sessions.entries.retain(|_, e| now.duration_since(e.last_seen) < ttl);
        let expired = before - sessions.entries.len();

        let mut evicted = 0usize;
        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, e)| e.touched)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.entries.remove(&id);
                    evicted += 1;
                }
                None => break,
            }
        }

        let mut session = Session::new(dataset);
        let updates = session.render_all(dataset);
        let id = new_session_id();
        let touched = sessions.tick();
        sessions.entries.insert(
            id.clone(),
            Entry {
                session,
                last_seen: now,
                touched,
            },
        );
        log(
            Level::Info,
            Domain::Session,
            "session_created",
            obj(&[
                ("session_id", v_str(&id)),
                ("active", json!(sessions.entries.len())),
                ("expired", json!(expired)),
                ("evicted", json!(evicted)),
            ]),
        );
        (id, updates)
    }

    /// Apply a control change; `None` if the session does not exist.
    pub fn apply(&self, id: &str, dataset: &Dataset, change: InputChange) -> Option<Vec<ChartUpdate>> {
        let mut sessions = self.lock();
        let entry = sessions.touch(id, self.ttl)?;
        let control = change.control();
        let updates = entry.session.apply(dataset, change);
        log(
            Level::Debug,
            Domain::Session,
            "input_changed",
            obj(&[
                ("session_id", v_str(id)),
                ("control", v_str(control.as_str())),
                ("outputs", json!(updates.len())),
            ]),
        );
        for u in &updates {
            log_chart_update(id, u.output.as_str(), u.revision, u.chart.len());
        }
        Some(updates)
    }

    pub fn snapshot(&self, id: &str) -> Option<SessionSnapshot> {
        let mut sessions = self.lock();
        let entry = sessions.touch(id, self.ttl)?;
        Some(entry.session.snapshot())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().entries.remove(id).is_some()
    }
}
