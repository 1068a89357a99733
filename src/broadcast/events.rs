//! Events pushed to dashboard subscribers
//!
//! Wire format is a JSON object with a `type` tag and a `data` payload:
//!
//! - `{"type":"snapshot","data":[Alert...]}`
//! - `{"type":"alert","action":"created"|"updated","data":Alert}`
//! - `{"type":"cleared","data":ClearedAlert}`
//! - `{"type":"stats","data":CycleStats}`

use crate::alert::{Alert, AlertTransition, ClearedAlert};
use crate::scanner::CycleStats;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Everything the scanner publishes
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerEvent {
    /// Full set of active alerts, sent once to each new subscriber
    Snapshot(Vec<Alert>),
    AlertCreated(Alert),
    AlertUpdated(Alert),
    AlertCleared(ClearedAlert),
    /// Aggregate counters after each scan cycle
    Stats(CycleStats),
}

impl ScannerEvent {
    /// Value of the `type` field on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            ScannerEvent::Snapshot(_) => "snapshot",
            ScannerEvent::AlertCreated(_) | ScannerEvent::AlertUpdated(_) => "alert",
            ScannerEvent::AlertCleared(_) => "cleared",
            ScannerEvent::Stats(_) => "stats",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<AlertTransition> for ScannerEvent {
    fn from(transition: AlertTransition) -> Self {
        match transition {
            AlertTransition::Created(alert) => ScannerEvent::AlertCreated(alert),
            AlertTransition::Updated(alert) => ScannerEvent::AlertUpdated(alert),
            AlertTransition::Cleared(cleared) => ScannerEvent::AlertCleared(cleared),
        }
    }
}

impl Serialize for ScannerEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScannerEvent::AlertCreated(alert) | ScannerEvent::AlertUpdated(alert) => {
                let action = if matches!(self, ScannerEvent::AlertCreated(_)) {
                    "created"
                } else {
                    "updated"
                };
                let mut state = serializer.serialize_struct("ScannerEvent", 3)?;
                state.serialize_field("type", self.type_name())?;
                state.serialize_field("action", action)?;
                state.serialize_field("data", alert)?;
                state.end()
            }
            ScannerEvent::Snapshot(alerts) => {
                let mut state = serializer.serialize_struct("ScannerEvent", 2)?;
                state.serialize_field("type", self.type_name())?;
                state.serialize_field("data", alerts)?;
                state.end()
            }
            ScannerEvent::AlertCleared(cleared) => {
                let mut state = serializer.serialize_struct("ScannerEvent", 2)?;
                state.serialize_field("type", self.type_name())?;
                state.serialize_field("data", cleared)?;
                state.end()
            }
            ScannerEvent::Stats(stats) => {
                let mut state = serializer.serialize_struct("ScannerEvent", 2)?;
                state.serialize_field("type", self.type_name())?;
                state.serialize_field("data", stats)?;
                state.end()
            }
        }
    }
}
