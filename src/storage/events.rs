//! Event store
//!
//! The analytics and forecast engines only need two capabilities from
//! persistence: insert an event, and fetch events in a date range filtered
//! by type and provider. `EventStore` is that seam; `JsonEventStore` is
//! the file-backed implementation used by the CLI.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CadenceResult;
use crate::models::{CashFlowEvent, EventType};

use super::file_io::{read_json, write_json_atomic};

/// Optional filters applied to a range query
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Only return events of these types, if set
    pub types: Option<Vec<EventType>>,
    /// Only return events from these providers, if set
    pub providers: Option<Vec<String>>,
}

impl EventFilter {
    /// A filter that matches everything
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: Vec<EventType>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = Some(providers);
        self
    }

    fn matches(&self, event: &CashFlowEvent) -> bool {
        if let Some(types) = &self.types {
            if !types.contains(&event.kind) {
                return false;
            }
        }
        if let Some(providers) = &self.providers {
            match &event.provider {
                Some(p) => {
                    if !providers.iter().any(|wanted| wanted.eq_ignore_ascii_case(p)) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

/// Insert/range-query capability over recorded cash-flow events
pub trait EventStore {
    /// Record an event. Events are immutable once inserted.
    fn insert(&mut self, event: CashFlowEvent) -> CadenceResult<()>;

    /// Fetch events with `start <= date <= end` matching the filter,
    /// ordered by date ascending.
    fn query(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filter: &EventFilter,
    ) -> CadenceResult<Vec<CashFlowEvent>>;
}

/// On-disk event container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EventData {
    events: Vec<CashFlowEvent>,
}

/// JSON-file-backed event store
pub struct JsonEventStore {
    path: PathBuf,
    events: Vec<CashFlowEvent>,
}

impl JsonEventStore {
    /// Open the store, loading any existing events from disk
    pub fn open(path: PathBuf) -> CadenceResult<Self> {
        let data: EventData = read_json(&path)?;
        let mut events = data.events;
        events.sort_by_key(|e| e.date);
        Ok(Self { path, events })
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn save(&self) -> CadenceResult<()> {
        let data = EventData {
            events: self.events.clone(),
        };
        write_json_atomic(&self.path, &data)
    }
}

impl EventStore for JsonEventStore {
    fn insert(&mut self, event: CashFlowEvent) -> CadenceResult<()> {
        // Keep the vec date-ordered so queries stay a simple scan
        let pos = self.events.partition_point(|e| e.date <= event.date);
        self.events.insert(pos, event);
        self.save()
    }

    fn query(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filter: &EventFilter,
    ) -> CadenceResult<Vec<CashFlowEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.date >= start && e.date <= end && filter.matches(e))
            .cloned()
            .collect())
    }
}
