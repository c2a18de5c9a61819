//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the seams between the setup procedure, the API and the
//! outside world. Adapters implement them; tests substitute scripted
//! doubles from [`crate::testkit`].
//!
//! ```text
//!              ┌───────────────────────────────┐
//!              │  Entrypoint / API services    │
//!              └───────────────────────────────┘
//!                 │        │         │       │
//!                 ▼        ▼         ▼       ▼
//!            ┌───────┐┌────────┐┌────────┐┌───────┐
//!            │ Probe ││Migrator││Launcher││ Store │
//!            └───────┘└────────┘└────────┘└───────┘
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::operator::OperatorPort;
pub use outbound::launcher::{Launcher, StartupCommand};
pub use outbound::migrator::Migrator;
pub use outbound::probe::ConnectivityProbe;
pub use outbound::store::{EventStore, IngestSummary};
