//! Breadth-first exploration with bounded wall-breaking.
//!
//! The search space is three-dimensional: visiting a cell with `b` walls
//! broken is distinct from visiting it with `b'` broken, so the visited
//! and parent structures are keyed on the layered [`crate::maze::Maze::key3`]
//! key. The final path may pass through cells that are walls in the
//! source grid; the search driver paints those specially.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::Error;

use super::{path, Core, PointInfo, SCAN_DIRS};

#[derive(Debug, Clone, Copy)]
struct Node {
	x: u32,
	y: u32,
	broken: u32,
	step: u32,
}

pub(super) struct Breaker {
	queue: VecDeque<Node>,
	visited: HashSet<u32>,
	parent: HashMap<u32, u32>,
	break_limit: u32,
}

impl Breaker {
	pub(super) fn new(break_limit: u32) -> Self {
		Self {
			queue: VecDeque::new(),
			visited: HashSet::new(),
			parent: HashMap::new(),
			break_limit,
		}
	}

	pub(super) fn seed(&mut self, core: &Core) {
		self.queue.clear();
		self.visited.clear();
		self.parent.clear();

		let (x, y) = core.origin;
		self.queue.push_back(Node {
			x,
			y,
			broken: 0,
			step: 0,
		});
		self.visited.insert(core.maze.key3(x, y, 0));
	}

	pub(super) fn step(&mut self, core: &mut Core) {
		let Some(cur) = self.queue.pop_front() else {
			core.fail(Error::NoPath);
			return;
		};

		core.way.push(PointInfo {
			x: cur.x,
			y: cur.y,
			step: cur.step,
			distance: cur.broken as f32,
		});

		// The end test projects away the broken-walls layer
		if core.at_target(cur.x, cur.y) {
			let (sx, sy) = core.origin;
			let route = path::rebuild_layered(
				&core.maze,
				&self.parent,
				core.maze.key3(sx, sy, 0),
				core.maze.key3(cur.x, cur.y, cur.broken),
			);
			core.complete(route);
			return;
		}

		let ck = core.maze.key3(cur.x, cur.y, cur.broken);

		for (dx, dy) in SCAN_DIRS {
			let nx = cur.x as i32 + dx;
			let ny = cur.y as i32 + dy;

			if !core.maze.in_bounds(nx, ny) {
				continue;
			}

			let broken = cur.broken + u32::from(core.maze.is_wall(nx, ny));
			if broken > self.break_limit {
				continue;
			}

			let (nx, ny) = (nx as u32, ny as u32);

			let nk = core.maze.key3(nx, ny, broken);

			if !self.visited.insert(nk) {
				continue;
			}

			self.parent.insert(nk, ck);
			self.queue.push_back(Node {
				x: nx,
				y: ny,
				broken,
				step: cur.step + 1,
			});
		}
	}
}
