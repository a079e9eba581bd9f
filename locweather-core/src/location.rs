//! Location collaborator seam: service-enabled query, permission prompt and a
//! one-shot fix.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    PermanentlyDenied,
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Permission::Granted)
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    /// Whether any location provider is switched on.
    fn is_enabled(&self) -> bool;

    /// Called when location is switched off, so the host can send the user to
    /// the relevant settings.
    fn prompt_enable(&self) {}

    async fn request_permission(&self) -> Permission;

    /// Suspends until the platform delivers one high-accuracy fix.
    async fn request_fix(&self) -> Result<Coordinates, LocationError>;
}

/// A location known up front, e.g. from config or command-line flags.
/// Disabled when no coordinates were supplied.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    coords: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    fn is_enabled(&self) -> bool {
        self.coords.is_some()
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_fix(&self) -> Result<Coordinates, LocationError> {
        self.coords
            .ok_or_else(|| LocationError::Unavailable("no coordinates configured".to_string()))
    }
}
