// SPDX-License-Identifier: AGPL-3.0
// Rentboard CLI - Terminal frontend
//
// The HTTP transport, terminal host and command shell live here; everything
// stateful is in rentboard-core.

pub mod client;
pub mod platform;
pub mod render;
pub mod shell;

pub use client::ApiClient;
pub use platform::TerminalPlatform;
pub use shell::{Command, Flow, Shell};
