//! The maze value: a dense grid of cell codes plus the seed it was
//! generated from.
//!
//! During a search only [`CELL_WALL`] blocks movement; every other code is
//! a passable cell, possibly painted over by the search driver for
//! animation purposes.

use crate::error::Error;

/// Passable, unpainted cell
pub const CELL_OPEN: u8 = 0;
/// Wall cell
pub const CELL_WALL: u8 = 1;
/// Wall cell used by a wall-breaking path; rendered as a marker over the
/// wall, never carved
pub const CELL_BROKEN_WALL: u8 = 27;

/// Offset between a strategy's path code and its visited code
pub(crate) const VISITED_OFFSET: u8 = 10;

/// Maze size tag
///
/// Only the standard size is supported by the generator; search accepts
/// any grid a [`Maze`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MazeSize {
	#[default]
	Standard,
}

impl MazeSize {
	/// Side length of a maze of this size, in cells
	#[must_use]
	pub const fn side(self) -> u32 {
		match self {
			Self::Standard => 71,
		}
	}
}

/// A rectangular maze of cell codes, indexed `(x, y)` with `(0, 0)` in
/// the top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
	width: u32,
	height: u32,
	/// The seed this maze was generated from (zero for hand-built grids)
	pub seed: i32,
	cells: Vec<u8>,
}

impl Maze {
	/// Create a maze with every cell set to `fill`
	#[must_use]
	pub fn filled(width: u32, height: u32, fill: u8, seed: i32) -> Self {
		Self {
			width,
			height,
			seed,
			cells: vec![fill; (width as usize) * (height as usize)],
		}
	}

	/// Create a maze from literal grid rows
	///
	/// # Errors
	/// Returns [`Error::EmptyGrid`] if there are no rows, a row is empty,
	/// or the rows have uneven lengths.
	pub fn from_grid(rows: &[&[u8]]) -> Result<Self, Error> {
		let height = rows.len();
		let width = rows.first().map_or(0, |r| r.len());

		if width == 0 || height == 0 || rows.iter().any(|r| r.len() != width) {
			return Err(Error::EmptyGrid);
		}

		let mut cells = Vec::with_capacity(width * height);
		for row in rows {
			cells.extend_from_slice(row);
		}

		Ok(Self {
			width: width as u32,
			height: height as u32,
			seed: 0,
			cells,
		})
	}

	/// Width of the maze in cells
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Height of the maze in cells
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The implicit start cell
	#[must_use]
	pub const fn start(&self) -> (u32, u32) {
		(1, 1)
	}

	/// The implicit end cell
	#[must_use]
	pub const fn finish(&self) -> (u32, u32) {
		(self.width - 2, self.height - 2)
	}

	/// Get the code of the cell at `(x, y)`
	///
	/// # Panics
	/// Panics if `(x, y)` is outside the grid.
	#[must_use]
	pub fn get(&self, x: u32, y: u32) -> u8 {
		self.cells[(y * self.width + x) as usize]
	}

	/// Set the code of the cell at `(x, y)`
	///
	/// # Panics
	/// Panics if `(x, y)` is outside the grid.
	pub fn set(&mut self, x: u32, y: u32, code: u8) {
		self.cells[(y * self.width + x) as usize] = code;
	}

	/// Whether `(x, y)` lies inside the grid
	#[must_use]
	pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
		x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
	}

	/// Whether `(x, y)` is a wall; everything outside the grid counts as
	/// wall
	#[must_use]
	pub fn is_wall(&self, x: i32, y: i32) -> bool {
		if self.in_bounds(x, y) {
			self.get(x as u32, y as u32) == CELL_WALL
		} else {
			true
		}
	}

	/// Whether `(x, y)` is inside the grid and not a wall
	#[must_use]
	pub fn is_open(&self, x: i32, y: i32) -> bool {
		self.in_bounds(x, y) && !self.is_wall(x, y)
	}

	/// Hash key of a cell for 2-D visited/parent maps
	#[must_use]
	pub const fn key(&self, x: u32, y: u32) -> u32 {
		y * self.width + x
	}

	/// Hash key of a `(cell, walls broken)` state for 3-D maps
	#[must_use]
	pub const fn key3(&self, x: u32, y: u32, broken: u32) -> u32 {
		broken * self.width * self.height + y * self.width + x
	}

	/// Invert [`Self::key`]
	#[must_use]
	pub const fn cell_of(&self, key: u32) -> (u32, u32) {
		(key % self.width, key / self.width)
	}

	/// Invert [`Self::key3`], dropping the layer
	#[must_use]
	pub const fn cell_of3(&self, key: u32) -> (u32, u32) {
		self.cell_of(key % (self.width * self.height))
	}

	/// Raw cell codes in row-major order
	#[must_use]
	pub fn cells(&self) -> &[u8] {
		&self.cells
	}

	/// Count of cells that are not walls
	#[must_use]
	pub fn open_cells(&self) -> usize {
		self.cells.iter().filter(|&&c| c != CELL_WALL).count()
	}
}

#[cfg(test)]
mod tests {
	use super::{Maze, CELL_OPEN, CELL_WALL};
	use crate::error::Error;

	#[test]
	fn from_grid_rejects_empty_and_ragged() {
		assert_eq!(Maze::from_grid(&[]), Err(Error::EmptyGrid));
		assert_eq!(Maze::from_grid(&[&[][..]]), Err(Error::EmptyGrid));
		assert_eq!(
			Maze::from_grid(&[&[0, 1][..], &[0][..]]),
			Err(Error::EmptyGrid)
		);
	}

	#[test]
	fn out_of_bounds_is_wall() {
		let maze = Maze::from_grid(&[&[CELL_OPEN][..]]).unwrap();
		assert!(maze.is_wall(-1, 0));
		assert!(maze.is_wall(0, -1));
		assert!(maze.is_wall(1, 0));
		assert!(!maze.is_wall(0, 0));
	}

	#[test]
	fn keys_round_trip() {
		let maze = Maze::filled(7, 5, CELL_WALL, 0);
		assert_eq!(maze.key(3, 2), 2 * 7 + 3);
		assert_eq!(maze.cell_of(maze.key(3, 2)), (3, 2));
		assert_eq!(maze.key3(3, 2, 0), maze.key(3, 2));
		assert_eq!(maze.key3(3, 2, 2), 2 * 35 + 2 * 7 + 3);
		assert_eq!(maze.cell_of3(maze.key3(3, 2, 2)), (3, 2));
	}

	#[test]
	fn implicit_endpoints() {
		let maze = Maze::filled(71, 71, CELL_WALL, 0);
		assert_eq!(maze.start(), (1, 1));
		assert_eq!(maze.finish(), (69, 69));
	}
}
