//! Product composition (bill of materials) core.
//!
//! The graph engine operates on an in-memory snapshot loaded once per
//! logical operation, so cycle detection, cost roll-up and availability
//! checks are pure functions that can be exercised without a database.

pub mod graph;

pub use graph::{Availability, BomGraph, ComponentEdge, CycleDetected, ExplodedComponent, ProductNode};
