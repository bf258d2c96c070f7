//! Interactive state of the map surface.
//!
//! `Loading` → `Ready` once both documents have arrived (in either order) and
//! the transform has been derived. Clicks and dismissals move between
//! `ReadyNoSelection` and `ReadySelected`. Any load error lands in `Failed`,
//! from which `retry` starts a new load generation. `teardown` detaches the
//! state so results that arrive late are dropped.

use crate::geometry::FeatureCollection;
use crate::municipality::{MunicipalityRecord, resolve_index};
use crate::projection::{CanvasSize, PixelPoint, Transform, compute_transform};
use crate::spatial::HitIndex;

/// Fixed logical drawing-surface size.
pub const DEFAULT_CANVAS: CanvasSize = CanvasSize::new(600.0, 800.0);

/// What a click that does not resolve to a record does to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickPolicy {
    /// Misses and unbound features leave the panel as it is.
    #[default]
    KeepSelection,
    /// Misses and unbound features close the panel.
    ClearOnMiss,
}

/// Identifies one load attempt. Deliveries for an older attempt are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    ReadyNoSelection,
    ReadySelected,
    Failed,
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub feature: usize,
    pub record: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stale ticket, detached surface, or the load already finished.
    Ignored,
    /// Accepted; still waiting for the other document.
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    NotReady,
    NoHit,
    Unresolved { feature: usize },
    Selected(Selection),
}

/// Everything needed to draw and hit-test, fixed once loading completes.
#[derive(Debug, Clone)]
pub struct ReadyMap {
    features: FeatureCollection,
    records: Vec<MunicipalityRecord>,
    transform: Transform,
    index: HitIndex,
    selection: Option<Selection>,
}

impl ReadyMap {
    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn records(&self) -> &[MunicipalityRecord] {
        &self.records
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_record(&self) -> Option<&MunicipalityRecord> {
        self.selection.and_then(|s| self.records.get(s.record))
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Loading {
        features: Option<FeatureCollection>,
        records: Option<Vec<MunicipalityRecord>>,
    },
    Ready(Box<ReadyMap>),
    Failed {
        reason: String,
    },
    Detached,
}

impl Stage {
    const fn loading() -> Self {
        Self::Loading {
            features: None,
            records: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapState {
    canvas: CanvasSize,
    policy: ClickPolicy,
    generation: u64,
    stage: Stage,
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS, ClickPolicy::default())
    }
}

impl MapState {
    pub fn new(canvas: CanvasSize, policy: ClickPolicy) -> Self {
        Self {
            canvas,
            policy,
            generation: 0,
            stage: Stage::loading(),
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Ticket for the load attempt currently in flight.
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket(self.generation)
    }

    pub fn phase(&self) -> Phase {
        match &self.stage {
            Stage::Loading { .. } => Phase::Loading,
            Stage::Ready(map) if map.selection.is_some() => Phase::ReadySelected,
            Stage::Ready(_) => Phase::ReadyNoSelection,
            Stage::Failed { .. } => Phase::Failed,
            Stage::Detached => Phase::Detached,
        }
    }

    pub fn ready(&self) -> Option<&ReadyMap> {
        match &self.stage {
            Stage::Ready(map) => Some(map),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.stage {
            Stage::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn selected_record(&self) -> Option<&MunicipalityRecord> {
        self.ready().and_then(ReadyMap::selected_record)
    }

    pub fn deliver_features(
        &mut self,
        ticket: LoadTicket,
        result: Result<FeatureCollection, String>,
    ) -> Delivery {
        if !self.accepts(ticket, "features") {
            return Delivery::Ignored;
        }
        match result {
            Ok(collection) => {
                if let Stage::Loading { features, .. } = &mut self.stage {
                    *features = Some(collection);
                }
                self.try_finish()
            }
            Err(reason) => self.fail(format!("municipality geometry: {reason}")),
        }
    }

    pub fn deliver_records(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<MunicipalityRecord>, String>,
    ) -> Delivery {
        if !self.accepts(ticket, "records") {
            return Delivery::Ignored;
        }
        match result {
            Ok(list) => {
                if let Stage::Loading { records, .. } = &mut self.stage {
                    *records = Some(list);
                }
                self.try_finish()
            }
            Err(reason) => self.fail(format!("municipality data: {reason}")),
        }
    }

    /// Start over after a failure. Returns the ticket for the new attempt.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        if !matches!(self.stage, Stage::Failed { .. }) {
            return None;
        }
        self.generation += 1;
        self.stage = Stage::loading();
        tracing::debug!(generation = self.generation, "retrying map data load");
        Some(self.ticket())
    }

    /// Resolve a click at `point` (pixel space) and update the selection.
    pub fn click(&mut self, point: PixelPoint) -> ClickOutcome {
        let policy = self.policy;
        let Stage::Ready(map) = &mut self.stage else {
            return ClickOutcome::NotReady;
        };

        let outcome = match map.index.find_at(point) {
            None => ClickOutcome::NoHit,
            Some(feature) => {
                let resolved = map
                    .features
                    .get(feature)
                    .and_then(|f| resolve_index(f, &map.records));
                match resolved {
                    Some(record) => ClickOutcome::Selected(Selection { feature, record }),
                    None => ClickOutcome::Unresolved { feature },
                }
            }
        };

        match outcome {
            ClickOutcome::Selected(selection) => map.selection = Some(selection),
            ClickOutcome::NoHit | ClickOutcome::Unresolved { .. } => {
                if policy == ClickPolicy::ClearOnMiss {
                    map.selection = None;
                }
            }
            ClickOutcome::NotReady => {}
        }
        tracing::debug!(x = point.x, y = point.y, ?outcome, "map click");
        outcome
    }

    /// Close the info panel. Returns whether anything was selected.
    pub fn dismiss(&mut self) -> bool {
        match &mut self.stage {
            Stage::Ready(map) => map.selection.take().is_some(),
            _ => false,
        }
    }

    /// The surface is going away; nothing may change state after this.
    pub fn teardown(&mut self) {
        self.stage = Stage::Detached;
    }

    fn accepts(&self, ticket: LoadTicket, what: &str) -> bool {
        let current = ticket.0 == self.generation;
        let loading = matches!(self.stage, Stage::Loading { .. });
        if !(current && loading) {
            tracing::debug!(
                what,
                ticket = ticket.0,
                generation = self.generation,
                phase = ?self.phase(),
                "ignoring late map data delivery"
            );
        }
        current && loading
    }

    fn try_finish(&mut self) -> Delivery {
        let Stage::Loading {
            features: Some(_),
            records: Some(_),
        } = &self.stage
        else {
            return Delivery::Pending;
        };
        let Stage::Loading {
            features: Some(features),
            records: Some(records),
        } = std::mem::replace(&mut self.stage, Stage::Detached)
        else {
            return Delivery::Pending;
        };

        match compute_transform(&features, self.canvas) {
            Ok(transform) => {
                let index = HitIndex::build(&features, &transform);
                tracing::debug!(
                    features = features.len(),
                    records = records.len(),
                    "map data ready"
                );
                self.stage = Stage::Ready(Box::new(ReadyMap {
                    features,
                    records,
                    transform,
                    index,
                    selection: None,
                }));
                Delivery::Ready
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn fail(&mut self, reason: String) -> Delivery {
        tracing::debug!(%reason, "map data load failed");
        self.stage = Stage::Failed { reason };
        Delivery::Failed
    }
}
