//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the route table (patterns, unique names, collisions)
//! - Check the not-found redirect target
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ShellConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{NotFoundPolicy, RouteConfig, ShellConfig};
use crate::routing::matcher::PathPattern;
use crate::routing::table::{RouteTable, RouteTableError};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),
    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("router.routes is empty")]
    NoRoutes,
    #[error("router.routes: {0}")]
    Route(#[from] RouteTableError),
    #[error("router.not_found: redirect target '{0}' is not a route")]
    UnknownRedirectTarget(String),
    #[error("router.not_found: redirect target '{route}' requires parameter '{param}'")]
    RedirectNeedsParams { route: String, param: String },
}

/// Validate a full shell configuration.
pub fn validate_config(config: &ShellConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(obs.log_level.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            obs.metrics_address.clone(),
        ));
    }

    let router = &config.router;
    if router.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }
    let route_errors = RouteTable::check(&router.routes);
    let table_ok = route_errors.is_empty();
    errors.extend(route_errors.into_iter().map(ValidationError::from));

    if let (true, NotFoundPolicy::Redirect { route }) = (table_ok, &router.not_found) {
        if let Err(e) = check_redirect_target(&router.routes, route) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The redirect target must name a route that builds without parameters.
pub(crate) fn check_redirect_target(
    routes: &[RouteConfig],
    target: &str,
) -> Result<(), ValidationError> {
    let Some(route) = routes.iter().find(|r| r.name == target) else {
        return Err(ValidationError::UnknownRedirectTarget(target.to_string()));
    };
    // Pattern validity is checked by RouteTable::check.
    let Ok(pattern) = PathPattern::parse(&route.path) else {
        return Ok(());
    };
    if let Some(param) = pattern.required_params().next() {
        return Err(ValidationError::RedirectNeedsParams {
            route: target.to_string(),
            param: param.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewId;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ShellConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ShellConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();
        config.router.routes.push(RouteConfig::new("Home", "/again", ViewId::Home));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Route(RouteTableError::DuplicateName(n)) if n == "Home")));
    }

    #[test]
    fn test_redirect_target_checks() {
        let mut config = ShellConfig::default();
        config.router.not_found = NotFoundPolicy::Redirect {
            route: "Missing".into(),
        };
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::UnknownRedirectTarget("Missing".into())])
        );

        config.router.routes = vec![RouteConfig::new("Home", "/call/:callId", ViewId::Home)];
        config.router.not_found = NotFoundPolicy::Redirect {
            route: "Home".into(),
        };
        assert!(matches!(
            validate_config(&config).unwrap_err()[0],
            ValidationError::RedirectNeedsParams { .. }
        ));
    }

    #[test]
    fn test_empty_routes() {
        let mut config = ShellConfig::default();
        config.router.routes.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoRoutes]));
    }
}
