// # dynip-core
//
// Core library for the Route53 dynamic IP updater.
//
// ## Architecture Overview
//
// One linear workflow, run once per invocation:
// - **LockGuard**: single-instance file lock, released on drop
// - **IpSource**: trait for determining the current public IP
// - **HostResolver**: trait for the public DNS "already correct" check
// - **DnsProvider**: trait for reading and upserting provider records
// - **Updater**: orchestrates lock → IP → DNS check → read → upsert
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Workflow logic is separate from I/O implementations
// 2. **Errors are values**: Every failure is returned to a single top-level handler
// 3. **Library-First**: The binary is a thin layer over this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod lock;
pub mod resolver;

// Re-export core types for convenience
pub use traits::{DnsProvider, HostResolver, IpSource};
pub use traits::{ChangeInfo, ResourceRecordSet};
pub use engine::{RunOutcome, Updater};
pub use config::{CredentialsConfig, TargetHost, UpdaterConfig};
pub use error::{Error, Result};
pub use lock::LockGuard;
pub use resolver::SystemResolver;
