//! Dashboard notification types
//!
//! Shared between the station server and dashboard clients. Topics are station
//! names; every notification is a "please refresh" signal, dashboards re-fetch
//! their own view after receiving one.

use serde::{Deserialize, Serialize};

use crate::models::Station;

/// Socket event emitted to station rooms
pub const DASHBOARD_REFRESH_EVENT: &str = "dashboard_refresh";

/// Socket event a dashboard sends to subscribe to a station
pub const JOIN_EVENT: &str = "join";

/// Refresh signal published on a station topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardEvent {
    pub station: Station,
}

impl DashboardEvent {
    pub fn refresh(station: Station) -> Self {
        Self { station }
    }

    /// Topic (room) this event is delivered to
    pub fn topic(&self) -> &str {
        self.station.as_str()
    }
}

/// Subscription request sent by a dashboard on connect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub station: Station,
}
