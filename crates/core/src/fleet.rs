//! Bus, route and schedule operations for an authenticated session

use crate::dispatcher::Dispatcher;
use crate::error::SessionResult;
use crate::validation;
use busadmin_http::PublicClient;
use busadmin_http::types::{
    AvailabilityWindow, Bus, MessageResponse, NewBus, NewRoute, NewSchedule, Page, PageQuery,
    Route, ScheduleSearch, ScheduledBus,
};

/// Fleet management calls, each validated locally and sent through the
/// session's [`Dispatcher`]
#[derive(Debug, Clone)]
pub struct FleetService {
    client: PublicClient,
    dispatcher: Dispatcher,
}

impl FleetService {
    pub fn new(client: PublicClient, dispatcher: Dispatcher) -> Self {
        Self { client, dispatcher }
    }

    pub async fn list_buses(&self, query: PageQuery) -> SessionResult<Page<Bus>> {
        validation::validate_page(&query)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.list_buses(&query).await }
            })
            .await
    }

    pub async fn available_buses(&self, window: &AvailabilityWindow) -> SessionResult<Page<Bus>> {
        validation::validate_window(window)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.available_buses(window).await }
            })
            .await
    }

    pub async fn add_bus(&self, bus: &NewBus) -> SessionResult<MessageResponse> {
        validation::validate_new_bus(bus)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.add_bus(bus).await }
            })
            .await
    }

    /// Without a page selector the backend returns every route
    pub async fn list_routes(&self, query: Option<PageQuery>) -> SessionResult<Page<Route>> {
        if let Some(query) = &query {
            validation::validate_page(query)?;
        }
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.list_routes(query.as_ref()).await }
            })
            .await
    }

    pub async fn add_route(&self, route: &NewRoute) -> SessionResult<MessageResponse> {
        validation::validate_new_route(route)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.add_route(route).await }
            })
            .await
    }

    pub async fn search_schedules(
        &self,
        search: &ScheduleSearch,
    ) -> SessionResult<Page<ScheduledBus>> {
        validation::validate_search(search)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.search_schedules(search).await }
            })
            .await
    }

    pub async fn list_schedules(&self, query: PageQuery) -> SessionResult<Page<ScheduledBus>> {
        validation::validate_page(&query)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.list_schedules(&query).await }
            })
            .await
    }

    pub async fn schedule_bus(&self, schedule: &NewSchedule) -> SessionResult<MessageResponse> {
        validation::validate_new_schedule(schedule)?;
        self.dispatcher
            .dispatch(|token| {
                let client = self.client.authenticate(token);
                async move { client.schedule_bus(schedule).await }
            })
            .await
    }
}
