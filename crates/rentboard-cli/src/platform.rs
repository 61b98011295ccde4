// SPDX-License-Identifier: AGPL-3.0
// Rentboard CLI - Terminal host
//
// A terminal has no vibration motor or header bar; the bell stands in for
// haptics and the viewport hooks only log.

use rentboard_core::{HostPlatform, Impact, PlatformError};
use std::io::{IsTerminal, Write};

pub struct TerminalPlatform {
    bell: bool,
}

impl TerminalPlatform {
    /// Ring the bell for haptics only when stderr is an interactive terminal
    pub fn detect() -> Self {
        Self {
            bell: std::io::stderr().is_terminal(),
        }
    }
}

impl HostPlatform for TerminalPlatform {
    fn haptic(&self, impact: Impact) -> Result<(), PlatformError> {
        if !self.bell {
            return Err(PlatformError("no terminal bell".to_string()));
        }
        tracing::trace!("{:?} impact rendered as a bell", impact);

        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| PlatformError(e.to_string()))
    }

    fn ready(&self) -> Result<(), PlatformError> {
        tracing::debug!("Terminal host ready");
        Ok(())
    }

    fn set_header_color(&self, color: &str) -> Result<(), PlatformError> {
        Err(PlatformError(format!(
            "terminal cannot set header colour {}",
            color
        )))
    }
}
