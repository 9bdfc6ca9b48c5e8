//! Shortest routes over road networks with A*.
//!
//! The road network is an external collaborator behind the [`graph::Graph`]
//! trait; the search in [`algorithms::astar`] only borrows it.

use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod cost;
pub mod derank;
pub mod float_cost;

// Graphs and routes
// -----------------
pub mod error;
pub mod graph;
pub mod graphs;
pub mod route;

// Search
// ------
pub mod frontier;
pub mod search;

// Algorithms
// ----------
pub mod algorithms;
