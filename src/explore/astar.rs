//! A* exploration: Dijkstra's settlement skeleton ordered by
//! `f = g + h` with a Manhattan heuristic.
//!
//! Manhattan distance is admissible and consistent for unit-cost
//! 4-neighbour grids, so the settled path is as short as the BFS one
//! while the frontier stays focused towards the end cell.

use std::{
	cmp::Reverse,
	collections::{BinaryHeap, HashMap, HashSet},
};

use crate::error::Error;

use super::{path, Core, PointInfo, SCAN_DIRS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Node {
	f: u32,
	g: u32,
	x: u32,
	y: u32,
}

const fn manhattan(from: (u32, u32), to: (u32, u32)) -> u32 {
	from.0.abs_diff(to.0) + from.1.abs_diff(to.1)
}

pub(super) struct AStar {
	heap: BinaryHeap<Reverse<Node>>,
	g_score: HashMap<u32, u32>,
	parent: HashMap<u32, u32>,
	closed: HashSet<u32>,
}

impl AStar {
	pub(super) fn new() -> Self {
		Self {
			heap: BinaryHeap::new(),
			g_score: HashMap::new(),
			parent: HashMap::new(),
			closed: HashSet::new(),
		}
	}

	pub(super) fn seed(&mut self, core: &Core) {
		self.heap.clear();
		self.g_score.clear();
		self.parent.clear();
		self.closed.clear();

		let (x, y) = core.origin;
		self.g_score.insert(core.maze.key(x, y), 0);
		self.heap.push(Reverse(Node {
			f: manhattan(core.origin, core.target),
			g: 0,
			x,
			y,
		}));
	}

	pub(super) fn step(&mut self, core: &mut Core) {
		let cur = loop {
			let Some(Reverse(node)) = self.heap.pop() else {
				core.fail(Error::NoPath);
				return;
			};

			if self.closed.insert(core.maze.key(node.x, node.y)) {
				break node;
			}
		};

		core.way.push(PointInfo {
			x: cur.x,
			y: cur.y,
			step: cur.g,
			distance: cur.g as f32,
		});

		if core.at_target(cur.x, cur.y) {
			let route =
				path::rebuild(&core.maze, &self.parent, core.origin, (cur.x, cur.y));
			core.complete(route);
			return;
		}

		let ck = core.maze.key(cur.x, cur.y);

		for (dx, dy) in SCAN_DIRS {
			let nx = cur.x as i32 + dx;
			let ny = cur.y as i32 + dy;

			if !core.maze.is_open(nx, ny) {
				continue;
			}

			let (nx, ny) = (nx as u32, ny as u32);
			let nk = core.maze.key(nx, ny);

			if self.closed.contains(&nk) {
				continue;
			}

			let ng = cur.g + 1;
			if self.g_score.get(&nk).is_none_or(|&old| ng < old) {
				self.g_score.insert(nk, ng);
				self.parent.insert(nk, ck);
				self.heap.push(Reverse(Node {
					f: ng + manhattan((nx, ny), core.target),
					g: ng,
					x: nx,
					y: ny,
				}));
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::tests::{reference_maze, run};
	use super::super::{Explorer, Strategy};

	#[test]
	fn finds_a_shortest_route() {
		let mut explorer = Explorer::new(reference_maze(), Strategy::AStar);
		explorer.set_route((1, 1), (1, 3));
		run(&mut explorer);

		assert!(explorer.found());
		assert_eq!(explorer.path().len(), 7);
	}

	#[test]
	fn is_as_short_as_bfs_but_settles_no_more_cells() {
		let maze = crate::generate::build(crate::maze::MazeSize::Standard, 0);
		let (ex, ey) = maze.finish();

		let mut bfs = Explorer::new(maze.clone(), Strategy::Bfs);
		bfs.set_route((1, 1), (ex as i32, ey as i32));
		run(&mut bfs);

		let mut astar = Explorer::new(maze, Strategy::AStar);
		astar.set_route((1, 1), (ex as i32, ey as i32));
		run(&mut astar);

		assert!(bfs.found() && astar.found());
		assert_eq!(bfs.path().len(), astar.path().len());
		assert!(astar.way().len() <= bfs.way().len());
	}
}
