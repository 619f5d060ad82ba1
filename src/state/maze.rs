use tracing::debug;

use crate::error::MazeError;
use crate::infra::Position;

/// Built-in reference layout. Every open cell is reachable from the spawn.
pub const CLASSIC_LAYOUT: &str = "\
###################
#o.......#.......o#
#.##.###.#.###.##.#
#.................#
#.##.#.##-##.#.##.#
#....#.#G G#.#....#
####.#.#####.#.####
#........P........#
#.##.###.#.###.##.#
#o.#.....#.....#.o#
###################";

const WALL: char = '#';
const OPEN: char = ' ';
const COLLECTIBLE: char = '.';
const POWER_COLLECTIBLE: char = 'o';
const GATE: char = '-';
const PROTAGONIST_SPAWN: char = 'P';
const ADVERSARY_SPAWN: char = 'G';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Open,
    Collectible,
    /// Passable for every mover; never holds a collectible.
    Gate,
}

impl Cell {
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }
}

/// Static maze geometry plus the live collectible flags of the running episode.
#[derive(Debug, Clone)]
pub struct Maze {
    pub width: i32,
    pub height: i32,
    layout: Vec<Cell>,
    cells: Vec<Cell>,
    remaining: usize,
    protagonist_spawn: Position,
    adversary_spawns: Vec<Position>,
    scatter_targets: Vec<Option<Position>>,
}

impl Maze {
    /// Parse a textual layout. Short rows are padded with walls, and every
    /// border cell must then be a wall.
    pub fn parse(source: &str) -> Result<Self, MazeError> {
        let rows: Vec<Vec<char>> = source.lines().map(|line| line.chars().collect()).collect();
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }

        let mut layout = Vec::with_capacity(width * height);
        let mut protagonist_spawn = None;
        let mut adversary_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            for x in 0..width {
                let pos = Position::new(x as i32, y as i32);
                let cell = match row.get(x).copied().unwrap_or(WALL) {
                    WALL => Cell::Wall,
                    OPEN => Cell::Open,
                    COLLECTIBLE | POWER_COLLECTIBLE => Cell::Collectible,
                    GATE => Cell::Gate,
                    PROTAGONIST_SPAWN => {
                        if let Some(first) = protagonist_spawn {
                            return Err(MazeError::DuplicateProtagonistSpawn { first, second: pos });
                        }
                        protagonist_spawn = Some(pos);
                        Cell::Open
                    }
                    ADVERSARY_SPAWN => {
                        adversary_spawns.push(pos);
                        Cell::Open
                    }
                    symbol => {
                        return Err(MazeError::UnknownSymbol {
                            symbol,
                            x: pos.x,
                            y: pos.y,
                        });
                    }
                };
                layout.push(cell);
            }
        }

        let protagonist_spawn = protagonist_spawn.ok_or(MazeError::MissingProtagonistSpawn)?;
        if let Some(index) = (0..layout.len()).find(|&i| {
            let (x, y) = (i % width, i / width);
            let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            on_border && layout[i].is_passable()
        }) {
            return Err(MazeError::OpenBorder {
                x: (index % width) as i32,
                y: (index / width) as i32,
            });
        }

        let maze = Self::from_layout(
            width as i32,
            height as i32,
            layout,
            protagonist_spawn,
            adversary_spawns,
        );
        debug!(
            "Parsed {}x{} maze with {} collectibles and {} adversaries",
            maze.width,
            maze.height,
            maze.total_collectibles(),
            maze.adversary_spawns.len()
        );
        Ok(maze)
    }

    pub fn classic() -> Result<Self, MazeError> {
        Self::parse(CLASSIC_LAYOUT)
    }

    /// Walled rectangle filled with collectibles: protagonist at (1, 1), one
    /// adversary in the opposite inner corner.
    pub fn open_arena(width: i32, height: i32) -> Result<Self, MazeError> {
        if width < 4 || height < 4 {
            return Err(MazeError::TooSmall { width, height });
        }

        let mut layout = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                layout.push(if border { Cell::Wall } else { Cell::Collectible });
            }
        }

        let protagonist_spawn = Position::new(1, 1);
        let adversary_spawn = Position::new(width - 2, height - 2);
        for pos in [protagonist_spawn, adversary_spawn] {
            layout[(pos.y * width + pos.x) as usize] = Cell::Open;
        }

        Ok(Self::from_layout(
            width,
            height,
            layout,
            protagonist_spawn,
            vec![adversary_spawn],
        ))
    }

    fn from_layout(
        width: i32,
        height: i32,
        layout: Vec<Cell>,
        protagonist_spawn: Position,
        adversary_spawns: Vec<Position>,
    ) -> Self {
        let remaining = layout.iter().filter(|cell| **cell == Cell::Collectible).count();
        let mut maze = Self {
            width,
            height,
            cells: layout.clone(),
            layout,
            remaining,
            protagonist_spawn,
            adversary_spawns,
            scatter_targets: Vec::new(),
        };
        maze.scatter_targets = (0..maze.adversary_spawns.len())
            .map(|index| maze.home_corner(index))
            .collect();
        maze
    }

    /// Open cell nearest to the corner assigned to adversary `index`
    /// (top-right, top-left, bottom-right, bottom-left, repeating).
    fn home_corner(&self, index: usize) -> Option<Position> {
        let corners = [
            Position::new(self.width - 1, 0),
            Position::new(0, 0),
            Position::new(self.width - 1, self.height - 1),
            Position::new(0, self.height - 1),
        ];
        let corner = corners[index % corners.len()];

        let mut best: Option<(i32, Position)> = None;
        for pos in self.positions() {
            if self.is_blocked(pos) {
                continue;
            }
            let distance = pos.distance(&corner);
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, pos));
            }
        }
        best.map(|(_, pos)| pos)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    /// Classification of `pos`; everything outside the grid reads as wall.
    pub fn cell(&self, pos: Position) -> Cell {
        self.index(pos).map_or(Cell::Wall, |index| self.cells[index])
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        !self.cell(pos).is_passable()
    }

    pub fn has_collectible(&self, pos: Position) -> bool {
        self.cell(pos) == Cell::Collectible
    }

    /// Consume the collectible at `pos`, if any.
    pub fn collect_at(&mut self, pos: Position) -> bool {
        let Some(index) = self.index(pos) else {
            return false;
        };
        if self.cells[index] != Cell::Collectible {
            return false;
        }
        self.cells[index] = Cell::Open;
        self.remaining -= 1;
        true
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.remaining
    }

    pub fn total_collectibles(&self) -> usize {
        self.layout.iter().filter(|cell| **cell == Cell::Collectible).count()
    }

    pub fn restore_collectibles(&mut self) {
        self.cells.clone_from(&self.layout);
        self.remaining = self.total_collectibles();
    }

    /// Every coordinate in row-major scan order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Remaining collectibles in scan order.
    pub fn collectibles(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|pos| self.has_collectible(*pos))
    }

    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors()
            .into_iter()
            .filter(|neighbor| !self.is_blocked(*neighbor))
    }

    pub fn protagonist_spawn(&self) -> Position {
        self.protagonist_spawn
    }

    pub fn adversary_spawns(&self) -> &[Position] {
        &self.adversary_spawns
    }

    pub fn scatter_target(&self, adversary: usize) -> Option<Position> {
        self.scatter_targets.get(adversary).copied().flatten()
    }
}
