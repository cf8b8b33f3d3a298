//! Request and response bodies exchanged with the backend
//!
//! The backend speaks camelCase JSON and identifies documents with `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("message", &self.message)
            .finish()
    }
}

/// Account registration form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Refresh-token exchange request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Refresh-token exchange response
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Bus seating/climate class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusType {
    #[serde(rename = "AC/Sleeper")]
    AcSleeper,
    #[serde(rename = "Non-AC/Sleeper")]
    NonAcSleeper,
    #[serde(rename = "AC/Seater")]
    AcSeater,
    #[serde(rename = "Non-AC/Seater")]
    NonAcSeater,
}

impl BusType {
    pub const ALL: [BusType; 4] = [
        BusType::AcSleeper,
        BusType::NonAcSleeper,
        BusType::AcSeater,
        BusType::NonAcSeater,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusType::AcSleeper => "AC/Sleeper",
            BusType::NonAcSleeper => "Non-AC/Sleeper",
            BusType::AcSeater => "AC/Seater",
            BusType::NonAcSeater => "Non-AC/Seater",
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid bus type: {s}"))
    }
}

/// A registered bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    #[serde(rename = "_id")]
    pub id: String,
    pub bus_number: String,
    pub bus_type: BusType,
    pub capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Bus creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBus {
    pub bus_number: String,
    pub bus_type: BusType,
    pub capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// A route between two locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(rename = "_id")]
    pub id: String,
    pub start_location: String,
    pub end_location: String,
    /// Kilometres
    pub distance: f64,
    /// Hours
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Route creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoute {
    pub start_location: String,
    pub end_location: String,
    pub distance: f64,
    pub duration: f64,
}

/// A bus scheduled on a route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledBus {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<String>,
    pub bus_number: String,
    #[serde(default)]
    pub bus_type: Option<BusType>,
    pub start_location: String,
    pub end_location: String,
    pub departure_time: DateTime<Utc>,
    #[serde(default)]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ScheduledBus {
    /// Identifier usable as a listing key
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().or(self.schedule_id.as_deref())
    }
}

/// Schedule creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub bus_id: String,
    pub route_id: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Total number of items across all pages, falling back to this page's length
    pub fn total(&self) -> u64 {
        self.total_count.unwrap_or(self.data.len() as u64)
    }
}

/// 1-based page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of pages needed for `total` items
    pub fn page_count(&self, total: u64) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// Time window used to look up buses free for scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

/// Search for scheduled buses between two locations on a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSearch {
    pub from: String,
    pub to: String,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub page: PageQuery,
}
