//! Error types and handling for the roadbite application

use thiserror::Error;

/// Message shown for every failure that happens after input validation
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while finding your route. Please try again.";

/// Main error type for the roadbite application
#[derive(Error, Debug)]
pub enum RoadbiteError {
    /// Start or destination was left empty
    #[error("Missing input: both a starting point and a destination are required")]
    MissingInput,

    /// Geocoding returned no match for an endpoint
    #[error("Location not found: {address}")]
    LocationNotFound { address: String },

    /// The directions service could not produce a route
    #[error("Route computation failed: {reason}")]
    RouteFailed { reason: String },

    /// Another search on the same finder has not finished yet
    #[error("A search is already in progress")]
    SearchInProgress,

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl RoadbiteError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(address: S) -> Self {
        Self::LocationNotFound {
            address: address.into(),
        }
    }

    pub fn route_failed<S: Into<String>>(reason: S) -> Self {
        Self::RouteFailed {
            reason: reason.into(),
        }
    }

    /// Get a user-friendly error message
    ///
    /// Lookup, routing and transport failures all collapse into one generic
    /// message; only problems the user can fix get their own text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RoadbiteError::MissingInput => {
                "Please enter both starting point and destination.".to_string()
            }
            RoadbiteError::SearchInProgress => {
                "A search is already running. Please wait for it to finish.".to_string()
            }
            RoadbiteError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            RoadbiteError::Validation { message } => format!("Invalid input: {message}"),
            RoadbiteError::LocationNotFound { .. }
            | RoadbiteError::RouteFailed { .. }
            | RoadbiteError::Api { .. }
            | RoadbiteError::Io { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest_middleware::Error> for RoadbiteError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::api(format!("request failed: {err}"))
    }
}
