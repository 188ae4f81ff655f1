//! Error types for the smartview library

use thiserror::Error;

/// Result type alias for smartview operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Error types for configuration, capture and frame processing
#[derive(Error, Debug)]
pub enum DetectorError {
    /// A color band violates its channel bounds or the band set is malformed
    #[error("Invalid color band configuration for '{label}': {reason}")]
    InvalidConfiguration { label: String, reason: String },

    /// A processing parameter is outside its valid range
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration: {message}")]
    ConfigLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Still image could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Results or configuration could not be serialized or written
    #[error("Failed to write output: {message}")]
    Output {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Frame source could not be opened
    #[error("Capture error: {reason}")]
    Capture { reason: String },

    /// OpenCV operation failed
    #[error("OpenCV error: {operation}")]
    OpenCv {
        operation: String,
        #[source]
        source: Option<opencv::Error>,
    },
}

impl DetectorError {
    /// Create an invalid configuration error for a band
    pub fn invalid_band(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create a configuration load error with context
    pub fn config_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an output error with context
    pub fn output<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Output {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCv {
            operation: operation.into(),
            source: Some(source),
        }
    }

    /// Check if this error indicates a condition the capture loop can survive
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DetectorError::OpenCv { .. } | DetectorError::ImageLoad { .. })
    }

    /// Get user-friendly error description for terminal display
    pub fn user_message(&self) -> String {
        match self {
            DetectorError::InvalidConfiguration { label, .. } => {
                format!("Color band '{}' is misconfigured. Check its lower/upper HSV bounds.", label)
            }
            DetectorError::InvalidParameter { parameter, .. } => {
                format!("Processing parameter '{}' is out of range.", parameter)
            }
            DetectorError::ConfigLoad { .. } => {
                "Could not read the configuration file. Generate one with `smartview config <path>`.".to_string()
            }
            DetectorError::Output { message, .. } => {
                format!("Could not write output ({}).", message)
            }
            DetectorError::Capture { .. } => {
                "Could not open camera. Check that it is connected and not in use.".to_string()
            }
            _ => "Frame processing failed.".to_string(),
        }
    }
}
