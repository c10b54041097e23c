//! # Loom Engine
//!
//! The Loom engine turns declarative activity descriptors into a canonical,
//! resolved activity graph with scoped names, bound parameters and iteration
//! semantics.
//!
//! ## Key Features
//!
//! - **Descriptors**: actions, resources, sub-workflows and `collect` iterations,
//!   built in code or loaded from YAML/JSON documents
//! - **Scoped names**: children of `P` named `N` resolve as `P::N`
//! - **Parameter binding**: `as` declarations, declared parameters and implicit
//!   inputs become typed [`loom_types::Parameter`]s
//! - **Guards**: `when` conditions are parsed and validated during resolution
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use loom_engine::{ActivityResolver, parse_activity_str};
//! use loom_types::DefaultTypeSystem;
//!
//! let descriptors = parse_activity_str(r#"
//! kind: collect
//! name: Pings
//! times: 3
//! as: attempt
//! activity:
//!   kind: action
//!   name: ping
//! "#)?;
//!
//! let resolver = ActivityResolver::new(Arc::new(DefaultTypeSystem::new()));
//! let activity = resolver.resolve(&descriptors[0], "Monitor")?;
//! assert_eq!(activity.name, "Monitor::Pings");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`descriptor`**: authored descriptors and host values
//! - **`params`**: parameter binding and value normalization
//! - **`resolve`**: the resolver
//! - **`activity`**: the resolved graph
//! - **`document`**: descriptor documents

pub mod activity;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod params;
pub mod resolve;

pub use activity::{Activity, ActivityKind, IterationStyle, State};
pub use descriptor::{
    ACTIVITY_KINDS, ActionDescriptor, ActivityDescriptor, AsSpec, CollectDescriptor, HostValue, ParameterSpec,
    ResourceDescriptor, StateSpec, WorkflowDescriptor,
};
pub use document::{parse_activity_file, parse_activity_str};
pub use error::ResolveError;
pub use resolve::ActivityResolver;
