use rand::Rng;

use crate::infra::Position;
use crate::state::{Behavior, Maze};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protagonist {
    pub position: Position,
    spawn: Position,
}

impl Protagonist {
    pub fn new(spawn: Position) -> Self {
        Self {
            position: spawn,
            spawn,
        }
    }

    pub fn respawn(&mut self) {
        self.position = self.spawn;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Adversary {
    pub position: Position,
    spawn: Position,
    home: Option<Position>,
    behavior: Behavior,
}

impl Adversary {
    pub fn new(spawn: Position, home: Option<Position>, behavior: Behavior) -> Self {
        Self {
            position: spawn,
            spawn,
            home,
            behavior,
        }
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn respawn(&mut self) {
        self.position = self.spawn;
        self.behavior.reset();
    }

    /// Move one cell according to the behavior policy. Never collects.
    pub fn advance<R: Rng + ?Sized>(&mut self, maze: &Maze, protagonist: Position, rng: &mut R) {
        self.position = self
            .behavior
            .next_position(maze, self.position, self.home, protagonist, rng);
    }
}
