//! Developer tooling: read-only world inspection for the CLI and the
//! desktop inspector panel.

mod inspector;

pub use inspector::{BodyInfo, WorldInspector, WorldSummary};
