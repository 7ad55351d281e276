use crate::find::{MapStorage, MapTrait, NodeReference};
use std::{fmt::Display, str::FromStr};

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Blocked,
    Passable,
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell::Blocked => "#",
                Cell::Passable => ".",
            }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// The order in which the search enumerates neighbors. It decides which of
    /// several equally short paths is returned, so it must never change.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];
}

/// A cell coordinate. `col` is the image x axis and `row` the image y axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    /// Build a point from image coordinates.
    pub fn from_xy(x: usize, y: usize) -> Self {
        Self { row: y, col: x }
    }

    pub fn x(&self) -> usize {
        self.col
    }

    pub fn y(&self) -> usize {
        self.row
    }

    /// Manhattan distance between two points
    pub fn distance(&self, other: &Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

impl NodeReference for Point {}

/// A MapTrait implementation that uses a rectangular grid of cells, stored row by row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Cell>,
}

impl GridMap {
    /// Create a map where every cell is passable.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::Passable; rows * columns],
        }
    }

    pub fn width(&self) -> usize {
        self.columns
    }

    pub fn height(&self) -> usize {
        self.rows
    }

    pub fn get(&self, point: Point) -> Cell {
        self.cells[point.row * self.columns + point.col]
    }

    pub fn set(&mut self, point: Point, cell: Cell) {
        self.cells[point.row * self.columns + point.col] = cell;
    }

    /// The neighbor one step away in `direction`, or `None` when that step leaves the map.
    pub fn neighbor(&self, node: Point, direction: Direction) -> Option<Point> {
        match direction {
            Direction::Up if node.row > 0 => Some(Point {
                row: node.row - 1,
                col: node.col,
            }),
            Direction::Left if node.col > 0 => Some(Point {
                row: node.row,
                col: node.col - 1,
            }),
            Direction::Down if node.row + 1 < self.rows => Some(Point {
                row: node.row + 1,
                col: node.col,
            }),
            Direction::Right if node.col + 1 < self.columns => Some(Point {
                row: node.row,
                col: node.col + 1,
            }),
            _ => None,
        }
    }

    /// Scales the map by the given factor, i.e. to make it twice as large, pass 2.
    /// Interpolates the cells by repeating the existing cells in the new grid.
    pub fn scale_up(&mut self, factor: usize) {
        let columns = self.columns * factor;
        let mut new_cells = vec![Cell::default(); self.rows * factor * columns];

        for row in 0..self.rows {
            for col in 0..self.columns {
                let cell = self.cells[row * self.columns + col];
                for r in 0..factor {
                    for c in 0..factor {
                        new_cells[(row * factor + r) * columns + col * factor + c] = cell;
                    }
                }
            }
        }

        self.rows *= factor;
        self.columns = columns;
        self.cells = new_cells;
    }

    /// Draw the map as a two-color image.
    pub fn to_image(&self, passable: Rgb<u8>, blocked: Rgb<u8>) -> RgbImage {
        RgbImage::from_fn(self.columns as u32, self.rows as u32, |x, y| {
            match self.get(Point::from_xy(x as usize, y as usize)) {
                Cell::Passable => passable,
                Cell::Blocked => blocked,
            }
        })
    }
}

impl Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Parses the format written by `Display`: one line per row, `#` for blocked
/// and `.` for passable cells.
impl FromStr for GridMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let columns = lines.first().map(|line| line.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(columns * lines.len());

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != columns {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    columns
                ));
            }
            for c in line.chars() {
                cells.push(match c {
                    '#' => Cell::Blocked,
                    '.' => Cell::Passable,
                    other => return Err(format!("invalid cell '{}' in row {}", other, row)),
                });
            }
        }

        Ok(GridMap {
            rows: lines.len(),
            columns,
            cells,
        })
    }
}

/// A MapStorage that keeps one value per cell in a single row-major vec
#[derive(Clone, Debug)]
pub struct CellStorage<T> {
    columns: usize,
    cells: Vec<T>,
}

impl<T> CellStorage<T> {
    /// All stored values, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(i, value)| {
            (
                Point {
                    row: i / columns,
                    col: i % columns,
                },
                value,
            )
        })
    }
}

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.col < self.columns && node.row * self.columns + node.col < self.cells.len()
    }

    fn get(&self, node: Self::Reference) -> T {
        self.cells[node.row * self.columns + node.col]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.cells[node.row * self.columns + node.col]
    }
}

impl<T: Display> Display for CellStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl MapTrait for GridMap {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.row < self.rows && node.col < self.columns
    }

    fn is_passable(&self, node: Self::Reference) -> bool {
        self.get(node) == Cell::Passable
    }

    fn neighbors_of(
        &self,
        node: Self::Reference,
    ) -> impl Iterator<Item = Option<Self::Reference>> {
        Direction::ALL
            .map(|direction| self.neighbor(node, direction))
            .into_iter()
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage {
            columns: self.columns,
            cells: vec![Default::default(); self.rows * self.columns],
        }
    }
}
