//! Implementation of search algorithms.
//!
//! These algorithms find routes over anything implementing
//! [`crate::graph::Graph`].

pub mod astar;
