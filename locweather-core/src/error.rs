/// Failure of a single weather API request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Weather API returned HTTP {0}")]
    Http(u16),

    #[error("Malformed weather API response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Http(code) => Some(*code),
            _ => None,
        }
    }
}

/// Location fix errors.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location request timed out")]
    Timeout,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Anything that ends a fetch attempt after the API call started.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to persist weather snapshot: {0:#}")]
    Store(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_exposes_status_code() {
        assert_eq!(FetchError::Http(404).status_code(), Some(404));
        assert_eq!(FetchError::Malformed("x".into()).status_code(), None);
    }

    #[test]
    fn pipeline_error_wraps_fetch_error_transparently() {
        let err = PipelineError::from(FetchError::Http(400));
        assert_eq!(err.to_string(), "Weather API returned HTTP 400");
    }
}
