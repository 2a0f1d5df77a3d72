//! The stepwise exploration engine.
//!
//! Every strategy sits behind the same tick-driven contract: construct an
//! [`Explorer`] from a maze value, set the route (and optionally a shared
//! cancellation flag), then call [`Explorer::update`] repeatedly. Each
//! call performs exactly one logical step, appending to the exploration
//! trajectory so an external layer can animate the work, and the explorer
//! moves itself to [`State::End`] once it has found a path, exhausted the
//! frontier, or observed cancellation.

use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use crate::{
	error::Error,
	maze::{Maze, CELL_OPEN, VISITED_OFFSET},
};

mod all;
mod astar;
mod bfs;
mod breaker;
mod dfs;
mod dijkstra;
mod floyd;
mod path;

/// Default bound on how many walls a breaking search may pass through
pub const K_MAX: u32 = 3;

/// Neighbour offsets in the order a depth-first search wants to *visit*
/// them (down, right, up, left); pushing them onto the stack in reverse
/// makes the stack pop them in exactly this order.
const DFS_DIRS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Neighbour offsets for every other strategy: right, left, down, up
const SCAN_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A visited record: a cell, the step counter it was reached at and an
/// optional scalar distance (used by the cost-ordered strategies)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointInfo {
	pub x: u32,
	pub y: u32,
	pub step: u32,
	pub distance: f32,
}

impl PointInfo {
	/// A record at `(x, y)` with zeroed step and distance
	#[must_use]
	pub const fn at(x: u32, y: u32) -> Self {
		Self {
			x,
			y,
			step: 0,
			distance: 0.0,
		}
	}

	/// The cell this record refers to
	#[must_use]
	pub const fn cell(self) -> (u32, u32) {
		(self.x, self.y)
	}
}

/// Explorer lifecycle; one [`Explorer::update`] call advances it by one
/// logical step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	Start,
	Explore,
	End,
}

/// The pathfinding strategies the laboratory can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	Dfs,
	Bfs,
	/// Breadth-first search allowed to break a bounded number of walls
	BfsPlus,
	Dijkstra,
	AStar,
	/// All-pairs Floyd-Warshall on a corridor-compressed graph
	Floyd,
	/// Runs every other strategy in lock-step
	All,
}

impl Strategy {
	/// The six comparable strategies, in their fixed order
	pub const COMPARED: [Self; 6] = [
		Self::Dfs,
		Self::Bfs,
		Self::BfsPlus,
		Self::Dijkstra,
		Self::AStar,
		Self::Floyd,
	];

	/// Cell code used to paint this strategy's final path
	///
	/// [`Strategy::All`] paints nothing itself (its children do) and maps
	/// to the open cell code.
	#[must_use]
	pub const fn path_code(self) -> u8 {
		match self {
			Self::Dfs => 2,
			Self::Bfs => 3,
			Self::Dijkstra => 4,
			Self::AStar => 5,
			Self::Floyd => 6,
			Self::BfsPlus => 7,
			Self::All => CELL_OPEN,
		}
	}

	/// Cell code used to paint this strategy's visited cells
	#[must_use]
	pub const fn visited_code(self) -> u8 {
		self.path_code() + VISITED_OFFSET
	}

	/// Position in [`Strategy::COMPARED`]; 6 for [`Strategy::All`]
	#[must_use]
	pub const fn index(self) -> usize {
		match self {
			Self::Dfs => 0,
			Self::Bfs => 1,
			Self::BfsPlus => 2,
			Self::Dijkstra => 3,
			Self::AStar => 4,
			Self::Floyd => 5,
			Self::All => 6,
		}
	}
}

impl Display for Strategy {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(match self {
			Self::Dfs => "DFS",
			Self::Bfs => "BFS",
			Self::BfsPlus => "BFS+",
			Self::Dijkstra => "Dijkstra",
			Self::AStar => "A*",
			Self::Floyd => "Floyd",
			Self::All => "ALL",
		})
	}
}

/// State shared by every strategy: the maze snapshot, the route, the
/// lifecycle fields and the two output sequences
pub(crate) struct Core {
	pub(crate) maze: Maze,
	start: (i32, i32),
	end: (i32, i32),
	/// Start cell, valid once the explorer has left [`State::Start`]
	pub(crate) origin: (u32, u32),
	/// End cell, valid once the explorer has left [`State::Start`]
	pub(crate) target: (u32, u32),
	pub(crate) state: State,
	pub(crate) time_step: u32,
	pub(crate) way: Vec<PointInfo>,
	pub(crate) path: Vec<PointInfo>,
	pub(crate) found: bool,
	pub(crate) error: Option<Error>,
	cancel: Option<Arc<AtomicBool>>,
}

impl Core {
	fn new(maze: Maze) -> Self {
		Self {
			maze,
			start: (0, 0),
			end: (0, 0),
			origin: (0, 0),
			target: (0, 0),
			state: State::Start,
			time_step: 0,
			way: Vec::new(),
			path: Vec::new(),
			found: false,
			error: None,
			cancel: None,
		}
	}

	pub(crate) fn cancelled(&self) -> bool {
		self.cancel
			.as_ref()
			.is_some_and(|flag| flag.load(Ordering::Relaxed))
	}

	/// Terminate with an error
	pub(crate) fn fail(&mut self, error: Error) {
		self.error = Some(error);
		self.state = State::End;
	}

	/// Terminate successfully with the reconstructed path
	pub(crate) fn complete(&mut self, path: Vec<PointInfo>) {
		self.path = path;
		self.found = true;
		self.state = State::End;
	}

	/// Whether `(x, y)` is the end cell
	pub(crate) fn at_target(&self, x: u32, y: u32) -> bool {
		(x, y) == self.target
	}

	/// Check the grid and the route; on failure the explorer ends with
	/// the matching error
	fn validate(&mut self) -> bool {
		if self.maze.width() == 0 || self.maze.height() == 0 {
			self.fail(Error::EmptyGrid);
			return false;
		}

		let (sx, sy) = self.start;
		let (ex, ey) = self.end;

		if !self.maze.in_bounds(sx, sy) || !self.maze.in_bounds(ex, ey) {
			self.fail(Error::OutOfRange);
			return false;
		}

		if self.maze.is_wall(sx, sy) || self.maze.is_wall(ex, ey) {
			self.fail(Error::EndpointIsWall);
			return false;
		}

		self.origin = (sx as u32, sy as u32);
		self.target = (ex as u32, ey as u32);
		true
	}
}

/// Per-strategy frontier state
enum Engine {
	Dfs(dfs::Dfs),
	Bfs(bfs::Bfs),
	Breaker(breaker::Breaker),
	Dijkstra(dijkstra::Dijkstra),
	AStar(astar::AStar),
	Floyd(floyd::Floyd),
	All(Vec<Explorer>),
}

/// A tick-driven maze search
///
/// Owns a clone of the maze, its frontier, visited and parent structures
/// for its whole lifetime; all of it is freed when the explorer is
/// dropped.
pub struct Explorer {
	core: Core,
	strategy: Strategy,
	engine: Engine,
}

impl Explorer {
	/// Create an explorer for `strategy` over a maze snapshot, using the
	/// default wall-breaking bound
	#[must_use]
	pub fn new(maze: Maze, strategy: Strategy) -> Self {
		Self::with_break_limit(maze, strategy, K_MAX)
	}

	/// Create an explorer with an explicit wall-breaking bound (only the
	/// breaking search reads it; in [`Strategy::All`] mode it is handed
	/// to the breaking child)
	#[must_use]
	pub fn with_break_limit(maze: Maze, strategy: Strategy, break_limit: u32) -> Self {
		let engine = match strategy {
			Strategy::Dfs => Engine::Dfs(dfs::Dfs::new()),
			Strategy::Bfs => Engine::Bfs(bfs::Bfs::new()),
			Strategy::BfsPlus => Engine::Breaker(breaker::Breaker::new(break_limit)),
			Strategy::Dijkstra => Engine::Dijkstra(dijkstra::Dijkstra::new()),
			Strategy::AStar => Engine::AStar(astar::AStar::new()),
			Strategy::Floyd => Engine::Floyd(floyd::Floyd::new()),
			Strategy::All => Engine::All(
				Strategy::COMPARED
					.iter()
					.map(|&s| Self::with_break_limit(maze.clone(), s, break_limit))
					.collect(),
			),
		};

		Self {
			core: Core::new(maze),
			strategy,
			engine,
		}
	}

	/// Set the route; takes effect on the next [`State::Start`] tick
	pub fn set_route(&mut self, start: (i32, i32), end: (i32, i32)) {
		self.core.start = start;
		self.core.end = end;
	}

	/// Attach a shared cancellation flag, polled at the start of every
	/// [`Explorer::update`] and inside long inner loops
	pub fn set_cancel(&mut self, cancel: Arc<AtomicBool>) {
		self.core.cancel = Some(cancel);
	}

	/// Return to [`State::Start`], clearing all outputs
	pub fn reset(&mut self) {
		self.core.state = State::Start;
		self.core.time_step = 0;
		self.core.way.clear();
		self.core.path.clear();
		self.core.found = false;
		self.core.error = None;
	}

	/// Advance the search by one logical step
	///
	/// In [`State::Start`] this validates the route and seeds the
	/// frontier; in [`State::Explore`] it consumes exactly one frontier
	/// element (one settlement for the cost-ordered strategies); in
	/// [`State::End`] it does nothing.
	pub fn update(&mut self) {
		if self.core.state == State::End {
			return;
		}

		if self.core.cancelled() {
			self.core.fail(Error::Cancelled);
			return;
		}

		match self.core.state {
			State::Start => {
				self.core.time_step = 1;
				self.core.way.clear();
				self.core.path.clear();
				self.core.found = false;
				self.core.error = None;

				if !self.core.validate() {
					return;
				}

				self.core.state = State::Explore;

				match &mut self.engine {
					Engine::Dfs(s) => s.seed(&self.core),
					Engine::Bfs(s) => s.seed(&self.core),
					Engine::Breaker(s) => s.seed(&self.core),
					Engine::Dijkstra(s) => s.seed(&self.core),
					Engine::AStar(s) => s.seed(&self.core),
					Engine::Floyd(s) => s.seed(),
					Engine::All(children) => all::seed(&self.core, children),
				}
			}
			State::Explore => {
				self.core.time_step += 1;

				match &mut self.engine {
					Engine::Dfs(s) => s.step(&mut self.core),
					Engine::Bfs(s) => s.step(&mut self.core),
					Engine::Breaker(s) => s.step(&mut self.core),
					Engine::Dijkstra(s) => s.step(&mut self.core),
					Engine::AStar(s) => s.step(&mut self.core),
					Engine::Floyd(s) => s.step(&mut self.core),
					Engine::All(children) => all::step(&mut self.core, children),
				}
			}
			State::End => {}
		}
	}

	/// The strategy this explorer runs
	#[must_use]
	pub const fn strategy(&self) -> Strategy {
		self.strategy
	}

	/// Current lifecycle state
	#[must_use]
	pub const fn state(&self) -> State {
		self.core.state
	}

	/// Monotonic tick counter
	#[must_use]
	pub const fn time_step(&self) -> u32 {
		self.core.time_step
	}

	/// The exploration trajectory, in visit order (append-only)
	#[must_use]
	pub fn way(&self) -> &[PointInfo] {
		&self.core.way
	}

	/// The reconstructed path from start to end; empty unless
	/// [`Explorer::found`]
	#[must_use]
	pub fn path(&self) -> &[PointInfo] {
		&self.core.path
	}

	/// Whether the end cell was reached
	#[must_use]
	pub const fn found(&self) -> bool {
		self.core.found
	}

	/// The terminal error, if the search failed
	#[must_use]
	pub const fn error(&self) -> Option<&Error> {
		self.core.error.as_ref()
	}

	/// The route as set by [`Explorer::set_route`]
	#[must_use]
	pub const fn route(&self) -> ((i32, i32), (i32, i32)) {
		(self.core.start, self.core.end)
	}

	/// Child explorers in [`Strategy::All`] mode; empty otherwise
	#[must_use]
	pub fn children(&self) -> &[Explorer] {
		match &self.engine {
			Engine::All(children) => children,
			_ => &[],
		}
	}
}
