//! Bus, route and schedule endpoints (authenticated client)

use super::{AuthenticatedClient, ClientError};
use crate::types::{
    AvailabilityWindow, Bus, MessageResponse, NewBus, NewRoute, NewSchedule, Page, PageQuery,
    Route, ScheduleSearch, ScheduledBus,
};
use chrono::SecondsFormat;
use reqwest::Method;

fn page_params(query: &PageQuery) -> [(&'static str, String); 2] {
    [
        ("page", query.page.to_string()),
        ("limit", query.limit.to_string()),
    ]
}

impl AuthenticatedClient {
    /// List buses, one page at a time
    pub async fn list_buses(&self, query: &PageQuery) -> Result<Page<Bus>, ClientError> {
        let req = self
            .request(Method::GET, "bus/getAllBuses")
            .query(&page_params(query));
        self.execute(req).await
    }

    /// Buses not already scheduled inside the window
    pub async fn available_buses(
        &self,
        window: &AvailabilityWindow,
    ) -> Result<Page<Bus>, ClientError> {
        let req = self.request(Method::GET, "bus/fetchAvailableBuses").query(&[
            (
                "departureTime",
                window
                    .departure_time
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            (
                "arrivalTime",
                window.arrival_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]);
        self.execute(req).await
    }

    /// Register a bus
    pub async fn add_bus(&self, bus: &NewBus) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, "bus/addBus").json(bus);
        self.execute(req).await
    }

    /// List routes; without a query the backend returns every route
    pub async fn list_routes(&self, query: Option<&PageQuery>) -> Result<Page<Route>, ClientError> {
        let mut req = self.request(Method::GET, "route/routelist");
        if let Some(query) = query {
            req = req.query(&page_params(query));
        }
        self.execute(req).await
    }

    /// Create a route
    pub async fn add_route(&self, route: &NewRoute) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, "route/addRoute").json(route);
        self.execute(req).await
    }

    /// List scheduled buses
    pub async fn list_schedules(
        &self,
        query: &PageQuery,
    ) -> Result<Page<ScheduledBus>, ClientError> {
        let req = self
            .request(Method::GET, "schedule/getScheduleBuses")
            .query(&page_params(query));
        self.execute(req).await
    }

    /// Search scheduled buses between two locations on a date
    pub async fn search_schedules(
        &self,
        search: &ScheduleSearch,
    ) -> Result<Page<ScheduledBus>, ClientError> {
        let req = self
            .request(Method::GET, "schedule/getScheduleBuses")
            .query(&[
                ("from", search.from.clone()),
                ("to", search.to.clone()),
                ("date", search.date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ])
            .query(&page_params(&search.page));
        self.execute(req).await
    }

    /// Schedule a bus on a route
    pub async fn schedule_bus(
        &self,
        schedule: &NewSchedule,
    ) -> Result<MessageResponse, ClientError> {
        let req = self
            .request(Method::POST, "schedule/scheduleBus")
            .json(schedule);
        self.execute(req).await
    }
}
