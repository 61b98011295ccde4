// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Host platform signals
//
// Haptics and viewport hooks are fire-and-forget. A missing or failing host
// never changes what the browser does.

/// Strength of a haptic impact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    Light,
    Medium,
}

#[derive(Debug, thiserror::Error)]
#[error("Host platform call failed: {0}")]
pub struct PlatformError(pub String);

/// Side-effect port to the host shell. Every method defaults to a no-op.
pub trait HostPlatform: Send + Sync {
    fn haptic(&self, _impact: Impact) -> Result<(), PlatformError> {
        Ok(())
    }

    /// The app finished loading
    fn ready(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    /// Expand to the full available viewport
    fn expand(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn set_header_color(&self, _color: &str) -> Result<(), PlatformError> {
        Ok(())
    }

    fn disable_vertical_swipes(&self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// A host with no platform integration
pub struct NoopPlatform;

impl HostPlatform for NoopPlatform {}

/// Run a host call, dropping any failure
pub(crate) fn best_effort(call: &str, result: Result<(), PlatformError>) {
    if let Err(e) = result {
        tracing::debug!("Ignoring {} failure: {}", call, e);
    }
}
