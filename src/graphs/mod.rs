//! Graph implementations.
//!
//! These are in-memory road networks the search can run on. Building them from
//! map data is left to callers.

pub mod road_graph;
