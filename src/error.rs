use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// The frontier ran dry before reaching the end node.
    #[error("No path from {start} to {end}")]
    NoPathFound { start: NodeId, end: NodeId },
    /// There is no node to start or end on.
    #[error("The graph has no nodes")]
    EmptyGraph,
}
