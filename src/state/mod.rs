mod behavior;
mod maze;
mod movers;

pub use behavior::{
    Behavior, BehaviorKind, CyclicSchedule, DEFAULT_PURSUIT_CHANCE, Mode, random_step, step_toward,
};
pub use maze::{CLASSIC_LAYOUT, Cell, Maze};
pub use movers::{Adversary, Protagonist};
