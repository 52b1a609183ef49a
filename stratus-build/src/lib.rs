//! Dependency-ordered template builder.
//!
//! Takes a declaration graph (names, declared types, dependency edges and
//! attribute usages) plus the realized value of each declaration, and
//! produces a complete [`stratus_ir::Template`]:
//!
//! 1. order resources with [`DependencyGraph`] (cycles are reported with
//!    source locations),
//! 2. resolve each declared type through the service registry,
//! 3. repair attribute references that lost their owner during value
//!    serialization ([`Resolver`], [`repair_value`]),
//! 4. assemble parameters, mappings, conditions and outputs, and set the
//!    serverless transform marker when needed.

mod builder;
mod discovery;
mod error;
mod graph;
mod resolve;

pub use builder::TemplateBuilder;
pub use discovery::{
    AttrRefUsage, DeclarationProvider, Declarations, DiscoveredItem, DiscoveredOutput,
    DiscoveredResource, JsonFileProvider, SourceLocation, VarAttrRefInfo,
};
pub use error::{CycleError, CycleNode, Error, Result};
pub use graph::DependencyGraph;
pub use resolve::{Origin, ResolvedUsage, Resolver, find_usage, repair_value, repair_value_at};
