use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to read fixture `{path}`")]
    Fixture {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("fixture `{path}` is not a JSON array of catalog documents")]
    FixtureFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn fixture(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Fixture {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn fixture_format(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::FixtureFormat {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
