//! Form input validation
//!
//! Every form is checked locally before anything is sent; a failure names the
//! first offending field.

use busadmin_http::types::{
    AvailabilityWindow, LoginRequest, NewBus, NewRoute, NewSchedule, PageQuery, ScheduleSearch,
    SignupRequest,
};
use regex::Regex;
use std::sync::LazyLock;

pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
pub const EMAIL_MAX_LEN: usize = 320;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 64;
pub const PHONE_DIGITS: usize = 10;

static EMAIL_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN));

/// A rejected form field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Field-level rules shared by the forms
pub mod validators {
    use super::*;

    pub fn validate_required(value: &str, field: &'static str) -> ValidationResult {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "is required"));
        }
        Ok(())
    }

    pub fn validate_email(email: &str, field: &'static str) -> ValidationResult {
        validate_required(email, field)?;
        if email.len() > EMAIL_MAX_LEN {
            return Err(ValidationError::new(
                field,
                format!("must be at most {EMAIL_MAX_LEN} characters"),
            ));
        }
        let pattern = EMAIL_REGEX
            .as_ref()
            .map_err(|e| ValidationError::new(field, format!("cannot be checked: {e}")))?;
        if !pattern.is_match(email) {
            return Err(ValidationError::new(field, "invalid email format"));
        }
        Ok(())
    }

    pub fn validate_password(password: &str, field: &'static str) -> ValidationResult {
        let len = password.chars().count();
        if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
            return Err(ValidationError::new(
                field,
                format!("must be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} characters"),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new(field, "must contain a digit"));
        }
        if !password.chars().any(char::is_lowercase) {
            return Err(ValidationError::new(field, "must contain a lowercase letter"));
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(ValidationError::new(field, "must contain an uppercase letter"));
        }
        Ok(())
    }

    pub fn validate_phone(phone: &str, field: &'static str) -> ValidationResult {
        if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new(
                field,
                format!("must be exactly {PHONE_DIGITS} digits"),
            ));
        }
        Ok(())
    }

    pub fn validate_positive(value: f64, field: &'static str) -> ValidationResult {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::new(field, "must be a positive number"));
        }
        Ok(())
    }
}

use validators::*;

pub fn validate_login(form: &LoginRequest) -> ValidationResult {
    validate_email(&form.email, "email")?;
    validate_required(&form.password, "password")
}

pub fn validate_signup(form: &SignupRequest) -> ValidationResult {
    validate_required(&form.name, "name")?;
    validate_email(&form.email, "email")?;
    validate_password(&form.password, "password")?;
    validate_phone(&form.phone, "phone")
}

pub fn validate_new_bus(bus: &NewBus) -> ValidationResult {
    validate_required(&bus.bus_number, "busNumber")?;
    if bus.capacity == 0 {
        return Err(ValidationError::new("capacity", "must be a positive integer"));
    }
    Ok(())
}

pub fn validate_new_route(route: &NewRoute) -> ValidationResult {
    validate_required(&route.start_location, "startLocation")?;
    validate_required(&route.end_location, "endLocation")?;
    validate_positive(route.distance, "distance")?;
    validate_positive(route.duration, "duration")
}

pub fn validate_new_schedule(schedule: &NewSchedule) -> ValidationResult {
    validate_required(&schedule.bus_id, "busId")?;
    validate_required(&schedule.route_id, "routeId")?;
    if schedule.arrival_time <= schedule.departure_time {
        return Err(ValidationError::new(
            "arrivalTime",
            "must be after the departure time",
        ));
    }
    validate_positive(schedule.price, "price")
}

pub fn validate_window(window: &AvailabilityWindow) -> ValidationResult {
    if window.arrival_time <= window.departure_time {
        return Err(ValidationError::new(
            "arrivalTime",
            "must be after the departure time",
        ));
    }
    Ok(())
}

pub fn validate_page(query: &PageQuery) -> ValidationResult {
    if query.page == 0 {
        return Err(ValidationError::new("page", "must be at least 1"));
    }
    if query.limit == 0 {
        return Err(ValidationError::new("limit", "must be at least 1"));
    }
    Ok(())
}

pub fn validate_search(search: &ScheduleSearch) -> ValidationResult {
    validate_required(&search.from, "from")?;
    validate_required(&search.to, "to")?;
    validate_page(&search.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use busadmin_http::types::BusType;
    use chrono::{DateTime, Utc};

    fn time(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("admin@example.com", "email").is_ok());
        assert!(validate_email("admin@example", "email").is_err());
        assert!(validate_email("ad min@example.com", "email").is_err());
        assert!(validate_email("", "email").is_err());

        let long = format!("{}@example.com", "a".repeat(EMAIL_MAX_LEN));
        let err = validate_email(&long, "email").unwrap_err();
        assert!(err.message.contains("320"));
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Secret123", "password").is_ok());
        assert!(validate_password("Sec123", "password").is_err());
        assert!(validate_password("secret123", "password").is_err());
        assert!(validate_password("SECRET123", "password").is_err());
        assert!(validate_password("SecretPass", "password").is_err());
        assert!(validate_password(&format!("Aa1{}", "x".repeat(62)), "password").is_err());
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone("9876543210", "phone").is_ok());
        assert!(validate_phone("987654321", "phone").is_err());
        assert!(validate_phone("98765432x0", "phone").is_err());
        assert!(validate_phone("+919876543", "phone").is_err());
    }

    #[test]
    fn signup_reports_first_bad_field() {
        let form = SignupRequest {
            name: " ".into(),
            email: "bad".into(),
            password: "weak".into(),
            phone: "1".into(),
        };
        assert_eq!(validate_signup(&form).unwrap_err().field, "name");
    }

    #[test]
    fn bus_capacity_must_be_positive() {
        let bus = NewBus {
            bus_number: "KA-01-1234".into(),
            bus_type: BusType::AcSleeper,
            capacity: 0,
            features: vec![],
        };
        assert_eq!(validate_new_bus(&bus).unwrap_err().field, "capacity");
    }

    #[test]
    fn route_distance_and_duration_must_be_positive() {
        let mut route = NewRoute {
            start_location: "Pune".into(),
            end_location: "Goa".into(),
            distance: 450.0,
            duration: 9.5,
        };
        assert!(validate_new_route(&route).is_ok());
        route.duration = 0.0;
        assert_eq!(validate_new_route(&route).unwrap_err().field, "duration");
        route.distance = f64::NAN;
        assert_eq!(validate_new_route(&route).unwrap_err().field, "distance");
    }

    #[test]
    fn schedule_arrival_must_follow_departure() {
        let schedule = NewSchedule {
            bus_id: "b1".into(),
            route_id: "r1".into(),
            departure_time: time("2026-11-01T20:00:00Z"),
            arrival_time: time("2026-11-01T08:00:00Z"),
            price: 800.0,
        };
        assert_eq!(
            validate_new_schedule(&schedule).unwrap_err().field,
            "arrivalTime"
        );
    }

    #[test]
    fn paging_starts_at_one() {
        assert!(validate_page(&PageQuery::default()).is_ok());
        assert_eq!(validate_page(&PageQuery::new(0, 10)).unwrap_err().field, "page");
        assert_eq!(validate_page(&PageQuery::new(1, 0)).unwrap_err().field, "limit");
    }
}
