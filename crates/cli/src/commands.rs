//! CLI commands

use anyhow::{Result, anyhow, bail};
use busadmin_core::{
    FleetService, LogoutReason, Session, SessionConfig, SessionError, SessionState, SystemClock,
};
use busadmin_http::types::{
    AvailabilityWindow, Bus, BusType, LoginRequest, NewBus, NewRoute, NewSchedule, Page,
    PageQuery, Route, ScheduleSearch, ScheduledBus, SignupRequest,
};
use busadmin_http::{ClientBuilder, PublicClient};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config;
use crate::store::FileTokenStore;

/// How often `watch` checks the session, and whether an unreachable backend
/// is back
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and save the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "BUSADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Register a new account (does not log in)
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "BUSADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Ten-digit phone number
        #[arg(long)]
        phone: String,
    },

    /// End the saved session
    Logout,

    /// Show the saved session
    Status,

    /// Bus operations
    Buses {
        #[command(subcommand)]
        command: BusCommands,
    },

    /// Route operations
    Routes {
        #[command(subcommand)]
        command: RouteCommands,
    },

    /// Schedule operations
    Schedules {
        #[command(subcommand)]
        command: ScheduleCommands,
    },

    /// Keep the session alive until it ends or Ctrl-C
    Watch,

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum BusCommands {
    /// List registered buses
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Buses free between two instants
    Available {
        /// Departure, RFC 3339 (e.g. 2026-11-01T08:00:00Z)
        #[arg(long)]
        departure: DateTime<Utc>,

        /// Arrival, RFC 3339
        #[arg(long)]
        arrival: DateTime<Utc>,
    },

    /// Register a bus
    Add {
        #[arg(long)]
        number: String,

        /// One of AC/Sleeper, Non-AC/Sleeper, AC/Seater, Non-AC/Seater
        #[arg(long = "type")]
        bus_type: BusType,

        #[arg(long)]
        capacity: u32,

        /// Repeat for several features
        #[arg(long = "feature")]
        features: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum RouteCommands {
    /// List routes; all of them unless a page is given
    List {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Add a route
    Add {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Kilometres
        #[arg(long)]
        distance: f64,

        /// Hours
        #[arg(long)]
        duration: f64,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// List scheduled buses
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Find scheduled buses between two places on a day
    Search {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Day of travel, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Put a bus on a route
    Add {
        #[arg(long)]
        bus_id: String,

        #[arg(long)]
        route_id: String,

        /// RFC 3339
        #[arg(long)]
        departure: DateTime<Utc>,

        /// RFC 3339
        #[arg(long)]
        arrival: DateTime<Utc>,

        #[arg(long)]
        price: f64,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with the defaults
    Init {
        /// Output file path (defaults to <data-dir>/config.json)
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 10)]
    limit: u32,
}

impl From<PageArgs> for PageQuery {
    fn from(args: PageArgs) -> Self {
        PageQuery::new(args.page, args.limit)
    }
}

fn optional_page(page: Option<u32>, limit: Option<u32>) -> Option<PageQuery> {
    if page.is_none() && limit.is_none() {
        return None;
    }
    let defaults = PageQuery::default();
    Some(PageQuery::new(
        page.unwrap_or(defaults.page),
        limit.unwrap_or(defaults.limit),
    ))
}

impl Commands {
    pub async fn execute(
        self,
        data_dir: PathBuf,
        config_file: Option<&Path>,
        base_url: Option<&str>,
    ) -> Result<()> {
        let open = || -> Result<Console> {
            let config = config::load_session_config(config_file, &data_dir, base_url)?;
            Console::open(&data_dir, config)
        };

        match self {
            Commands::Config { command } => command.execute(&data_dir),
            Commands::Login { email, password } => open()?.login(email, password).await,
            Commands::Signup {
                name,
                email,
                password,
                phone,
            } => {
                open()?
                    .signup(SignupRequest {
                        name,
                        email,
                        password,
                        phone,
                    })
                    .await
            }
            Commands::Logout => open()?.logout(),
            Commands::Status => open()?.status(),
            Commands::Buses { command } => command.execute(&open()?).await,
            Commands::Routes { command } => command.execute(&open()?).await,
            Commands::Schedules { command } => command.execute(&open()?).await,
            Commands::Watch => open()?.watch().await,
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, data_dir: &Path) -> Result<()> {
        match self {
            ConfigCommands::Init { output } => {
                let config_path = output.unwrap_or_else(|| data_dir.join(config::CONFIG_FILE));

                // Create parent directory if it doesn't exist
                if let Some(parent) = config_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                config::generate_default_config(&config_path)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
        }
    }
}

impl BusCommands {
    async fn execute(self, console: &Console) -> Result<()> {
        console.require_session()?;
        match self {
            BusCommands::List { page } => {
                let query = PageQuery::from(page);
                let buses = console.fleet.list_buses(query).await.map_err(report)?;
                print_buses(&buses);
                print_page_footer(&buses, Some(query));
            }
            BusCommands::Available { departure, arrival } => {
                let window = AvailabilityWindow {
                    departure_time: departure,
                    arrival_time: arrival,
                };
                let buses = console
                    .fleet
                    .available_buses(&window)
                    .await
                    .map_err(report)?;
                print_buses(&buses);
            }
            BusCommands::Add {
                number,
                bus_type,
                capacity,
                features,
            } => {
                let bus = NewBus {
                    bus_number: number,
                    bus_type,
                    capacity,
                    features,
                };
                let response = console.fleet.add_bus(&bus).await.map_err(report)?;
                println!("{}", response.message);
            }
        }
        Ok(())
    }
}

impl RouteCommands {
    async fn execute(self, console: &Console) -> Result<()> {
        console.require_session()?;
        match self {
            RouteCommands::List { page, limit } => {
                let query = optional_page(page, limit);
                let routes = console.fleet.list_routes(query).await.map_err(report)?;
                print_routes(&routes);
                print_page_footer(&routes, query);
            }
            RouteCommands::Add {
                from,
                to,
                distance,
                duration,
            } => {
                let route = NewRoute {
                    start_location: from,
                    end_location: to,
                    distance,
                    duration,
                };
                let response = console.fleet.add_route(&route).await.map_err(report)?;
                println!("{}", response.message);
            }
        }
        Ok(())
    }
}

impl ScheduleCommands {
    async fn execute(self, console: &Console) -> Result<()> {
        console.require_session()?;
        match self {
            ScheduleCommands::List { page } => {
                let query = PageQuery::from(page);
                let schedules = console
                    .fleet
                    .list_schedules(query)
                    .await
                    .map_err(report)?;
                print_schedules(&schedules);
                print_page_footer(&schedules, Some(query));
            }
            ScheduleCommands::Search {
                from,
                to,
                date,
                page,
            } => {
                let search = ScheduleSearch {
                    from,
                    to,
                    date: date.and_time(NaiveTime::MIN).and_utc(),
                    page: page.into(),
                };
                let schedules = console
                    .fleet
                    .search_schedules(&search)
                    .await
                    .map_err(report)?;
                print_schedules(&schedules);
                print_page_footer(&schedules, Some(search.page));
            }
            ScheduleCommands::Add {
                bus_id,
                route_id,
                departure,
                arrival,
                price,
            } => {
                let schedule = NewSchedule {
                    bus_id,
                    route_id,
                    departure_time: departure,
                    arrival_time: arrival,
                    price,
                };
                let response = console
                    .fleet
                    .schedule_bus(&schedule)
                    .await
                    .map_err(report)?;
                println!("{}", response.message);
            }
        }
        Ok(())
    }
}

/// Session, fleet service and client for one CLI invocation
pub struct Console {
    client: PublicClient,
    session: Session,
    fleet: FleetService,
}

impl Console {
    pub fn open(data_dir: &Path, config: SessionConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .base_url(&config.base_url)
            .timeout(config.request_timeout())
            .build()?;
        let session = Session::new(
            Rc::new(client.clone()),
            Rc::new(FileTokenStore::new(data_dir)),
            Rc::new(SystemClock),
            config,
        );
        let fleet = FleetService::new(client.clone(), session.dispatcher());

        Ok(Self {
            client,
            session,
            fleet,
        })
    }

    fn require_session(&self) -> Result<()> {
        if !self.session.resume()? {
            bail!("Not logged in. Run `busadmin login` first.");
        }
        Ok(())
    }

    async fn login(&self, email: String, password: String) -> Result<()> {
        let credentials = LoginRequest { email, password };
        self.session.login(&credentials).await.map_err(report)?;
        println!("Logged in as {}", credentials.email);
        Ok(())
    }

    async fn signup(&self, form: SignupRequest) -> Result<()> {
        let response = self.session.signup(&form).await.map_err(report)?;
        println!("{}", response.message);
        println!("Run `busadmin login --email {}` to sign in.", form.email);
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        if self.session.resume()? {
            self.session.logout(LogoutReason::UserRequested);
            println!("Logged out");
        } else {
            println!("Not logged in");
        }
        Ok(())
    }

    fn status(&self) -> Result<()> {
        if !self.session.resume()? {
            println!("Not logged in");
            return Ok(());
        }

        println!("Backend:  {}", self.client.base_url());
        println!("Session:  {}", describe_state(self.session.state()));
        match self.session.access_expires_at() {
            Some(expires) if expires > Utc::now() => {
                let left = expires - Utc::now();
                println!(
                    "Access:   valid until {} ({}m {}s left)",
                    expires.to_rfc3339(),
                    left.num_minutes(),
                    left.num_seconds() % 60
                );
            }
            Some(expires) => println!(
                "Access:   expired at {}; renewed on next request",
                expires.to_rfc3339()
            ),
            None => println!("Access:   unreadable token; renewed on next request"),
        }
        Ok(())
    }

    async fn watch(&self) -> Result<()> {
        self.require_session()?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _logout = self.session.on_logout(move |reason| {
            let _ = tx.send(reason);
        });

        println!("Watching session (Ctrl-C to stop)");
        if let Some(expires) = self.session.access_expires_at() {
            println!("Access token expires at {}", expires.to_rfc3339());
        }

        // The first tick is immediate, so an expiring session is renewed on start
        let mut keep_alive = tokio::time::interval(KEEP_ALIVE_INTERVAL);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    result?;
                    println!("Stopped; session kept");
                    return Ok(());
                }
                Some(reason) = rx.recv() => {
                    println!("Session ended: {reason}");
                    return Ok(());
                }
                _ = keep_alive.tick() => {
                    if self.session.is_awaiting_reconnect() {
                        let online = self.client.is_reachable().await;
                        info!(
                            online,
                            attempts = self.session.retry_attempts(),
                            max = self.session.config().max_refresh_retries,
                            "reconnect check"
                        );
                        self.session.set_online(online);
                    } else {
                        self.renew_if_unarmed().await;
                    }
                }
            }
        }
    }

    /// Refresh now when no renewal timer covers the access token.
    ///
    /// A token already inside the renewal lead window gets no timer; requests
    /// refresh it on use, but `watch` makes none.
    async fn renew_if_unarmed(&self) {
        if !self.session.is_authenticated()
            || self.session.has_pending_renewal()
            || self.session.is_awaiting_reconnect()
        {
            return;
        }
        match self.session.refresh().await {
            Ok(_) => info!("session renewed"),
            // Network failures wait for reconnection; fatal ones end the session
            Err(err) => warn!(error = %err, kind = ?err.kind(), "session renewal failed"),
        }
    }
}

/// Turn a session error into the message shown to the operator
fn report(err: SessionError) -> anyhow::Error {
    tracing::debug!(error = ?err, kind = ?err.kind(), "session operation failed");
    if err.ends_session() {
        return anyhow!("{} Run `busadmin login` to continue.", err.user_message());
    }
    anyhow!(err.user_message())
}

fn describe_state(state: SessionState) -> &'static str {
    match state {
        SessionState::LoggedOut => "logged out",
        SessionState::Authenticated => "authenticated",
        SessionState::RefreshPending => "renewing",
    }
}

fn print_buses(page: &Page<Bus>) {
    if page.data.is_empty() {
        println!("No buses");
        return;
    }
    println!("{:<26} {:<12} {:<16} {:>8}  FEATURES", "ID", "NUMBER", "TYPE", "CAPACITY");
    for bus in &page.data {
        println!(
            "{:<26} {:<12} {:<16} {:>8}  {}",
            bus.id,
            bus.bus_number,
            bus.bus_type.as_str(),
            bus.capacity,
            bus.features.join(", ")
        );
    }
}

fn print_routes(page: &Page<Route>) {
    if page.data.is_empty() {
        println!("No routes");
        return;
    }
    println!("{:<26} {:<18} {:<18} {:>10} {:>8}", "ID", "FROM", "TO", "KM", "HOURS");
    for route in &page.data {
        let duration = route
            .duration
            .map(|hours| format!("{hours:.1}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<26} {:<18} {:<18} {:>10.1} {:>8}",
            route.id, route.start_location, route.end_location, route.distance, duration
        );
    }
}

fn print_schedules(page: &Page<ScheduledBus>) {
    if page.data.is_empty() {
        println!("No scheduled buses");
        return;
    }
    println!(
        "{:<12} {:<18} {:<18} {:<17} {:<17} {:>8}",
        "BUS", "FROM", "TO", "DEPARTS", "ARRIVES", "PRICE"
    );
    for schedule in &page.data {
        let arrives = schedule
            .arrival_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        let price = schedule
            .price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<18} {:<18} {:<17} {:<17} {:>8}",
            schedule.bus_number,
            schedule.start_location,
            schedule.end_location,
            schedule.departure_time.format("%Y-%m-%d %H:%M"),
            arrives,
            price
        );
    }
}

fn print_page_footer<T>(page: &Page<T>, query: Option<PageQuery>) {
    let total = page.total();
    match query {
        Some(query) => println!(
            "Page {} of {} ({} total)",
            query.page,
            query.page_count(total).max(1),
            total
        ),
        None => println!("{total} total"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busadmin_core::claims::{AccessClaims, encode_unsigned};
    use busadmin_core::{TokenPair, TokenStore};
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::task::LocalSet;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_valid_for(secs: i64) -> String {
        encode_unsigned(&AccessClaims {
            exp: Utc::now().timestamp() + secs,
            iat: None,
            sub: None,
        })
    }

    fn console_for(server: &MockServer, dir: &TempDir) -> Console {
        let config = SessionConfig {
            base_url: format!("{}/api", server.uri()),
            ..Default::default()
        };
        Console::open(dir.path(), config).unwrap()
    }

    #[test]
    fn report_points_to_login_when_session_is_gone() {
        let message = report(SessionError::SessionExpired).to_string();
        assert!(message.contains("busadmin login"));

        let message = report(SessionError::Network("refused".into())).to_string();
        assert!(!message.contains("busadmin login"));
    }

    #[test]
    fn optional_page_only_when_asked() {
        assert_eq!(optional_page(None, None), None);
        assert_eq!(optional_page(Some(3), None), Some(PageQuery::new(3, 10)));
        assert_eq!(optional_page(None, Some(50)), Some(PageQuery::new(1, 50)));
    }

    #[tokio::test]
    async fn login_persists_session_for_next_invocation() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let access = token_valid_for(3600);

        Mock::given(method("POST"))
            .and(path("/api/user/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": access,
                "refreshToken": "refresh-1",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/bus/getAllBuses"))
            .and(header("authorization", format!("Bearer {access}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [],
                "totalCount": 0,
            })))
            .expect(1)
            .mount(&server)
            .await;

        LocalSet::new()
            .run_until(async {
                let console = console_for(&server, &dir);
                console
                    .login("admin@example.com".into(), "Secret123".into())
                    .await
                    .unwrap();

                // A later invocation starts from the saved file
                let console = console_for(&server, &dir);
                console.require_session().unwrap();
                let page = console.fleet.list_buses(PageQuery::default()).await.unwrap();
                assert!(page.data.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn commands_need_a_saved_session() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        LocalSet::new()
            .run_until(async {
                let console = console_for(&server, &dir);
                let err = console.require_session().unwrap_err();
                assert!(err.to_string().contains("Not logged in"));
            })
            .await;
    }

    #[tokio::test]
    async fn logout_removes_saved_session() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        store
            .set(&TokenPair::new(token_valid_for(3600), "refresh-1"))
            .unwrap();

        LocalSet::new()
            .run_until(async {
                let console = console_for(&server, &dir);
                console.logout().unwrap();
            })
            .await;

        assert!(store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn watch_renews_token_without_renewal_timer() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        // Inside the 60 s lead window, so resuming arms no timer
        store
            .set(&TokenPair::new(token_valid_for(2), "refresh-1"))
            .unwrap();
        let renewed = token_valid_for(3600);

        Mock::given(method("POST"))
            .and(path("/api/user/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": renewed,
            })))
            .expect(1)
            .mount(&server)
            .await;

        LocalSet::new()
            .run_until(async {
                let console = console_for(&server, &dir);
                console.require_session().unwrap();
                assert!(!console.session.has_pending_renewal());

                console.renew_if_unarmed().await;
                assert!(console.session.has_pending_renewal());
                assert_eq!(console.session.state(), SessionState::Authenticated);

                // Now covered by the timer
                console.renew_if_unarmed().await;
            })
            .await;

        assert_eq!(store.get().unwrap().unwrap().access_token, renewed);
    }

    #[tokio::test]
    async fn watch_leaves_scheduled_renewal_alone() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        store
            .set(&TokenPair::new(token_valid_for(3600), "refresh-1"))
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/api/user/refresh"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        LocalSet::new()
            .run_until(async {
                let console = console_for(&server, &dir);
                console.require_session().unwrap();
                assert!(console.session.has_pending_renewal());
                console.renew_if_unarmed().await;
            })
            .await;
    }
}
