use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::trace;

use crate::error::ConfigError;
use crate::infra::{AStar, Position};
use crate::state::Maze;

/// Chance that a `Mixed` adversary pursues on a given tick.
pub const DEFAULT_PURSUIT_CHANCE: f64 = 0.5;

/// Behavior selection as configured, before any per-adversary state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Random,
    Pursuit,
    Cyclic,
    Mixed,
}

impl FromStr for BehaviorKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(BehaviorKind::Random),
            "pursuit" | "chase" => Ok(BehaviorKind::Pursuit),
            "cyclic" | "scatter" => Ok(BehaviorKind::Cyclic),
            "mixed" => Ok(BehaviorKind::Mixed),
            _ => Err(ConfigError::InvalidValue {
                key: "ghost mode".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BehaviorKind::Random => "random",
            BehaviorKind::Pursuit => "pursuit",
            BehaviorKind::Cyclic => "cyclic",
            BehaviorKind::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Head for the adversary's home corner.
    Scatter,
    /// Head for the protagonist.
    Pursue,
}

/// Tick budget of each phase of the scatter/pursue cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicSchedule {
    pub scatter_ticks: u32,
    pub pursue_ticks: u32,
}

impl Default for CyclicSchedule {
    fn default() -> Self {
        Self {
            scatter_ticks: 7,
            pursue_ticks: 20,
        }
    }
}

impl CyclicSchedule {
    fn duration(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Scatter => self.scatter_ticks,
            Mode::Pursue => self.pursue_ticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Uniform choice among open neighbours.
    Random,
    /// One shortest-path step toward the protagonist.
    Pursuit,
    /// Timed scatter/pursue machine. `ticks` counts ticks spent in `mode`.
    Cyclic {
        schedule: CyclicSchedule,
        mode: Mode,
        ticks: u32,
    },
    /// Stateless per-tick coin flip between pursuit and random.
    Mixed { pursuit_chance: f64 },
}

impl Behavior {
    pub fn cyclic(schedule: CyclicSchedule) -> Self {
        Behavior::Cyclic {
            schedule,
            mode: Mode::Scatter,
            ticks: 0,
        }
    }

    pub fn mixed(pursuit_chance: f64) -> Self {
        Behavior::Mixed {
            pursuit_chance: pursuit_chance.clamp(0.0, 1.0),
        }
    }

    pub fn from_kind(kind: BehaviorKind, schedule: CyclicSchedule) -> Self {
        match kind {
            BehaviorKind::Random => Behavior::Random,
            BehaviorKind::Pursuit => Behavior::Pursuit,
            BehaviorKind::Cyclic => Behavior::cyclic(schedule),
            BehaviorKind::Mixed => Behavior::mixed(DEFAULT_PURSUIT_CHANCE),
        }
    }

    /// Current phase of a cyclic machine.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Behavior::Cyclic { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    /// Clear mode timers back to the start of an episode.
    pub fn reset(&mut self) {
        if let Behavior::Cyclic { mode, ticks, .. } = self {
            *mode = Mode::Scatter;
            *ticks = 0;
        }
    }

    /// Advance one tick and return the cell the adversary moves to.
    pub fn next_position<R: Rng + ?Sized>(
        &mut self,
        maze: &Maze,
        current: Position,
        home: Option<Position>,
        target: Position,
        rng: &mut R,
    ) -> Position {
        match self {
            Behavior::Random => random_step(maze, current, rng),
            Behavior::Pursuit => step_toward(maze, current, target, rng),
            Behavior::Mixed { pursuit_chance } => {
                if rng.random_bool(*pursuit_chance) {
                    step_toward(maze, current, target, rng)
                } else {
                    random_step(maze, current, rng)
                }
            }
            Behavior::Cyclic {
                schedule,
                mode,
                ticks,
            } => {
                if *ticks >= schedule.duration(*mode) {
                    *mode = match *mode {
                        Mode::Scatter => Mode::Pursue,
                        Mode::Pursue => Mode::Scatter,
                    };
                    *ticks = 0;
                    trace!("Adversary at {} switched to {:?}", current, mode);
                }
                *ticks += 1;

                let goal = match mode {
                    Mode::Scatter => home,
                    Mode::Pursue => Some(target),
                };
                match goal {
                    Some(goal) => step_toward(maze, current, goal, rng),
                    None => random_step(maze, current, rng),
                }
            }
        }
    }
}

/// Uniformly random open neighbour, or stay put when boxed in.
pub fn random_step<R: Rng + ?Sized>(maze: &Maze, current: Position, rng: &mut R) -> Position {
    let options: Vec<Position> = maze.open_neighbors(current).collect();
    options.choose(rng).copied().unwrap_or(current)
}

/// First step of the shortest path to `goal`; random when there is none.
pub fn step_toward<R: Rng + ?Sized>(
    maze: &Maze,
    current: Position,
    goal: Position,
    rng: &mut R,
) -> Position {
    match AStar::find_path(maze, current, goal) {
        Some(path) if path.len() >= 2 => path[1],
        _ => random_step(maze, current, rng),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const CORRIDOR: &str = "#########\n#P     G#\n#########";

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Cyclic".parse::<BehaviorKind>(), Ok(BehaviorKind::Cyclic));
        assert_eq!("chase".parse::<BehaviorKind>(), Ok(BehaviorKind::Pursuit));
        assert!("teleport".parse::<BehaviorKind>().is_err());
    }

    #[test]
    fn test_pursuit_steps_along_shortest_path() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut behavior = Behavior::Pursuit;
        let next = behavior.next_position(
            &maze,
            Position::new(7, 1),
            None,
            Position::new(1, 1),
            &mut rng,
        );
        assert_eq!(next, Position::new(6, 1));
    }

    #[test]
    fn test_random_step_stays_when_boxed_in() {
        let maze = Maze::parse("###\n#P#\n###").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let here = Position::new(1, 1);
        assert_eq!(random_step(&maze, here, &mut rng), here);
    }

    #[test]
    fn test_random_step_only_picks_open_neighbors() {
        let maze = Maze::parse("#####\n# P #\n## ##\n#####").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let here = Position::new(2, 1);
        for _ in 0..50 {
            let next = random_step(&maze, here, &mut rng);
            assert!(here.is_adjacent(&next));
            assert!(!maze.is_blocked(next));
        }
    }

    #[test]
    fn test_cyclic_alternates_on_schedule() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let schedule = CyclicSchedule {
            scatter_ticks: 2,
            pursue_ticks: 3,
        };
        let mut behavior = Behavior::cyclic(schedule);
        let home = Some(Position::new(7, 1));
        let protagonist = Position::new(1, 1);
        let mut pos = Position::new(4, 1);

        let mut modes = Vec::new();
        let mut positions = Vec::new();
        for _ in 0..7 {
            pos = behavior.next_position(&maze, pos, home, protagonist, &mut rng);
            modes.push(behavior.mode().unwrap());
            positions.push(pos.x);
        }

        use Mode::{Pursue, Scatter};
        assert_eq!(
            modes,
            vec![Scatter, Scatter, Pursue, Pursue, Pursue, Scatter, Scatter]
        );
        assert_eq!(positions, vec![5, 6, 5, 4, 3, 4, 5]);

        behavior.reset();
        assert_eq!(behavior.mode(), Some(Scatter));
    }

    #[test]
    fn test_mixed_extremes() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut always = Behavior::mixed(2.0);
        assert_eq!(always, Behavior::Mixed { pursuit_chance: 1.0 });
        for _ in 0..10 {
            let next = always.next_position(
                &maze,
                Position::new(4, 1),
                None,
                Position::new(1, 1),
                &mut rng,
            );
            assert_eq!(next, Position::new(3, 1));
        }
    }

    #[test]
    fn test_mixed_never_pursues_at_zero() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut never = Behavior::mixed(-1.0);
        assert_eq!(never, Behavior::Mixed { pursuit_chance: 0.0 });

        let current = Position::new(4, 1);
        let mut away = 0;
        for _ in 0..64 {
            let next = never.next_position(&maze, current, None, Position::new(1, 1), &mut rng);
            assert!(next == Position::new(3, 1) || next == Position::new(5, 1));
            if next == Position::new(5, 1) {
                away += 1;
            }
        }
        assert!(away > 0 && away < 64);
    }
}
