//! Discrete state abstraction used as the value-table key

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::infra::Position;
use crate::sim::Simulation;

/// An adversary within this Manhattan distance raises the threat flag.
pub const THREAT_RADIUS: i32 = 2;
/// More than this many collectibles left counts as `Many`.
pub const MANY_COLLECTIBLES_ABOVE: usize = 30;
/// More than this many (and at most `MANY_COLLECTIBLES_ABOVE`) counts as `Medium`.
pub const MEDIUM_COLLECTIBLES_ABOVE: usize = 10;

/// Which half of the grid the protagonist occupies on each axis. A coordinate
/// below `dimension / 2` is the near half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub fn of(pos: Position, width: i32, height: i32) -> Self {
        let east = pos.x >= width / 2;
        let south = pos.y >= height / 2;
        match (south, east) {
            (false, false) => Quadrant::NorthWest,
            (false, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthWest,
            (true, true) => Quadrant::SouthEast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectibleBucket {
    Few,
    Medium,
    Many,
}

impl CollectibleBucket {
    pub fn of(remaining: usize) -> Self {
        if remaining > MANY_COLLECTIBLES_ABOVE {
            CollectibleBucket::Many
        } else if remaining > MEDIUM_COLLECTIBLES_ABOVE {
            CollectibleBucket::Medium
        } else {
            CollectibleBucket::Few
        }
    }
}

/// 4 quadrants x 2 threat levels x 3 buckets = 24 reachable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbstractState {
    pub quadrant: Quadrant,
    pub threat: bool,
    pub collectibles: CollectibleBucket,
}

impl AbstractState {
    pub const COUNT: usize = 24;

    pub fn observe(sim: &Simulation) -> Self {
        let maze = sim.maze();
        let protagonist = sim.protagonist_position();
        let threat = sim
            .adversaries()
            .iter()
            .any(|adversary| adversary.position.distance(&protagonist) <= THREAT_RADIUS);

        Self {
            quadrant: Quadrant::of(protagonist, maze.width, maze.height),
            threat,
            collectibles: CollectibleBucket::of(sim.remaining_collectibles()),
        }
    }
}

impl fmt::Display for AbstractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{}/{:?}",
            self.quadrant,
            if self.threat { "threat" } else { "clear" },
            self.collectibles
        )
    }
}
