mod pathfinding;
mod types;

pub use pathfinding::AStar;
pub use types::{Direction, Position};

// ============================================================================
// Helper functions
// ============================================================================

/// Direction of the first move along `path`, which must start at `current`.
pub fn path_to_direction(current: Position, path: &[Position]) -> Option<Direction> {
    if path.len() < 2 {
        return None;
    }
    Direction::between(current, path[1])
}
