//! Concurrent nearest-per-category lookups for the home view.
//!
//! One task per category on a `JoinSet`. Outcomes are recorded as tasks finish,
//! in whatever order that is, and each change of the aggregation state is
//! published on a `watch` channel. Dropping `run` drops the set, which aborts
//! lookups still in flight.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::common::Coordinates;
use crate::domains::categories::Category;
use crate::domains::places::{LookupError, PlaceLookup, Resource};

pub type LookupOutcome = Result<Option<Resource>, LookupError>;

/// What `AggregationState::record` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Settled,
    /// This outcome settled the last pending category.
    Completed,
    UnknownCategory,
    AlreadySettled,
    AfterCompletion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationEntry {
    pub category: &'static Category,
    pub outcome: Option<LookupOutcome>,
}

/// Progress of one aggregation. `loading` goes from true to false once, when
/// every expected category has settled.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationState {
    entries: Vec<AggregationEntry>,
    settled: usize,
    loading: bool,
}

impl AggregationState {
    pub fn new(categories: &[&'static Category]) -> Self {
        Self {
            entries: categories
                .iter()
                .map(|&category| AggregationEntry {
                    category,
                    outcome: None,
                })
                .collect(),
            settled: 0,
            loading: !categories.is_empty(),
        }
    }

    pub fn expected(&self) -> usize {
        self.entries.len()
    }

    pub fn settled(&self) -> usize {
        self.settled
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn entries(&self) -> &[AggregationEntry] {
        &self.entries
    }

    pub fn record(&mut self, key: &str, outcome: LookupOutcome) -> Recorded {
        if !self.loading {
            return Recorded::AfterCompletion;
        }
        let Some(entry) = self.entries.iter_mut().find(|e| e.category.key == key) else {
            return Recorded::UnknownCategory;
        };
        if entry.outcome.is_some() {
            return Recorded::AlreadySettled;
        }

        entry.outcome = Some(outcome);
        self.settled += 1;
        if self.settled == self.entries.len() {
            self.loading = false;
            Recorded::Completed
        } else {
            Recorded::Settled
        }
    }

    fn finish(self) -> AggregatedResources {
        AggregatedResources {
            entries: self
                .entries
                .into_iter()
                .map(|e| {
                    let outcome = e
                        .outcome
                        .unwrap_or_else(|| Err(LookupError::Provider("lookup never settled".into())));
                    (e.category, outcome)
                })
                .collect(),
        }
    }
}

/// Final outcome per category, in the order the categories were given.
#[derive(Debug, Clone)]
pub struct AggregatedResources {
    entries: Vec<(&'static Category, LookupOutcome)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedResource<'a> {
    pub category: &'static Category,
    pub resource: &'a Resource,
}

impl AggregatedResources {
    /// Categories that produced a resource.
    pub fn resolved(&self) -> Vec<ResolvedResource<'_>> {
        self.entries
            .iter()
            .filter_map(|(category, outcome)| match outcome {
                Ok(Some(resource)) => Some(ResolvedResource {
                    category: *category,
                    resource,
                }),
                _ => None,
            })
            .collect()
    }

    /// Categories whose lookup failed.
    pub fn failures(&self) -> Vec<(&'static Category, &LookupError)> {
        self.entries
            .iter()
            .filter_map(|(category, outcome)| outcome.as_ref().err().map(|e| (*category, e)))
            .collect()
    }

    /// Categories that had nothing in range.
    pub fn empty(&self) -> Vec<&'static Category> {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Ok(None)))
            .map(|(category, _)| *category)
            .collect()
    }

    /// "Could not load: Blood Bank, Bus Stop" when anything failed.
    pub fn failure_notice(&self) -> Option<String> {
        let failed: Vec<&str> = self.failures().iter().map(|(c, _)| c.label).collect();
        if failed.is_empty() {
            None
        } else {
            Some(format!("Could not load: {}", failed.join(", ")))
        }
    }
}

pub struct ResourceAggregator {
    lookup: PlaceLookup,
    state: watch::Sender<AggregationState>,
}

impl ResourceAggregator {
    pub fn new(lookup: PlaceLookup) -> Self {
        let (state, _) = watch::channel(AggregationState::new(&[]));
        Self { lookup, state }
    }

    /// Live view of the current run.
    pub fn subscribe(&self) -> watch::Receiver<AggregationState> {
        self.state.subscribe()
    }

    /// Look up the nearest resource for every category around `center`.
    pub async fn run(
        &self,
        center: Coordinates,
        categories: &[&'static Category],
    ) -> AggregatedResources {
        let mut state = AggregationState::new(categories);
        self.state.send_replace(state.clone());

        let mut tasks = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, &'static Category> = HashMap::new();
        for &category in categories {
            let lookup = self.lookup.clone();
            let handle = tasks.spawn(async move { lookup.nearest(center, category).await });
            pending.insert(handle.id(), category);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => {
                    error!(error = %e, "Category lookup task failed");
                    (e.id(), Err(LookupError::Provider(e.to_string())))
                }
            };
            let Some(category) = pending.remove(&id) else {
                continue;
            };

            if let Err(e) = &outcome {
                warn!(category = %category.key, error = %e, "Category lookup failed");
            }
            let recorded = state.record(category.key, outcome);
            debug!(category = %category.key, ?recorded, settled = state.settled(), "Category settled");
            self.state.send_replace(state.clone());
        }

        info!(categories = state.expected(), "Aggregation finished");
        state.finish()
    }
}
