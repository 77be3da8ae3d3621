//! Topoforge Synth - single-pass deployment topology synthesizer
//!
//! Consumes a static configuration (services, global counts, addressing) and
//! produces a frozen, serializable [`Topology`]: resource and workload
//! descriptors plus an acyclic set of "must-be-ready-before" edges. An
//! external orchestration engine executes the plan; independent subtrees may
//! run in parallel there as long as every edge is honored.
//!
//! This crate performs no I/O and has no async surface: every value is
//! computed from already-known inputs, and all failures are deterministic
//! configuration errors reported synchronously.
//!
//! ## Usage
//!
//! ```
//! use topoforge_synth::{synthesize, ServiceSpec, SynthConfig};
//!
//! let config = SynthConfig::new("demo", 2, 2)
//!     .with_service(ServiceSpec::new("auth", "auth-service", vec![4005]).with_data_store());
//! let output = synthesize(config)?;
//! assert_eq!(output.topology.workloads.len(), 1);
//! # Ok::<(), topoforge_types::TopologyError>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod builder;
pub mod config;
pub mod synthesize;
pub mod template;

// Re-exports
pub use builder::TopologyBuilder;
pub use config::{Addressing, GatewaySpec, ServiceSpec, SynthConfig, Upstream};
pub use synthesize::{synthesize, SynthOutput, Synthesizer};
pub use topoforge_types::{NodeId, Secret, TopoResult, Topology, TopologyError};
