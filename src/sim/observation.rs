use std::fmt;

use crate::infra::Position;
use crate::state::{Adversary, Cell, Maze, Protagonist};

pub const CODE_OPEN: u8 = 0;
pub const CODE_WALL: u8 = 1;
pub const CODE_COLLECTIBLE: u8 = 2;
pub const CODE_ADVERSARY: u8 = 3;
pub const CODE_PROTAGONIST: u8 = 4;

/// Row-major `height x width` grid of cell codes. Always rebuilt from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub width: i32,
    pub height: i32,
    cells: Vec<u8>,
}

impl Observation {
    pub(crate) fn capture(maze: &Maze, protagonist: &Protagonist, adversaries: &[Adversary]) -> Self {
        let mut cells: Vec<u8> = maze
            .positions()
            .map(|pos| match maze.cell(pos) {
                Cell::Wall => CODE_WALL,
                Cell::Open | Cell::Gate => CODE_OPEN,
                Cell::Collectible => CODE_COLLECTIBLE,
            })
            .collect();

        let width = maze.width;
        let mut mark = |pos: Position, code: u8| {
            cells[(pos.y * width + pos.x) as usize] = code;
        };
        mark(protagonist.position, CODE_PROTAGONIST);
        // Adversaries are drawn last so a collision shows the adversary.
        for adversary in adversaries {
            mark(adversary.position, CODE_ADVERSARY);
        }

        Self {
            width: maze.width,
            height: maze.height,
            cells,
        }
    }

    pub fn get(&self, pos: Position) -> Option<u8> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.cells.get((pos.y * self.width + pos.x) as usize).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.width as usize)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row
                .iter()
                .map(|code| match *code {
                    CODE_WALL => '#',
                    CODE_COLLECTIBLE => '.',
                    CODE_ADVERSARY => 'G',
                    CODE_PROTAGONIST => 'P',
                    _ => ' ',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
