//! Dijkstra exploration: one settlement per tick over a min-heap.
//!
//! Every edge has unit weight, so the settled distances equal BFS depths;
//! the strategy exists for its distinct settlement order and as the
//! baseline for the heuristic variant.

use std::{
	cmp::Reverse,
	collections::{BinaryHeap, HashMap, HashSet},
};

use crate::error::Error;

use super::{path, Core, PointInfo, SCAN_DIRS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Node {
	dist: u32,
	x: u32,
	y: u32,
}

pub(super) struct Dijkstra {
	heap: BinaryHeap<Reverse<Node>>,
	dist: HashMap<u32, u32>,
	parent: HashMap<u32, u32>,
	closed: HashSet<u32>,
}

impl Dijkstra {
	pub(super) fn new() -> Self {
		Self {
			heap: BinaryHeap::new(),
			dist: HashMap::new(),
			parent: HashMap::new(),
			closed: HashSet::new(),
		}
	}

	pub(super) fn seed(&mut self, core: &Core) {
		self.heap.clear();
		self.dist.clear();
		self.parent.clear();
		self.closed.clear();

		let (x, y) = core.origin;
		self.dist.insert(core.maze.key(x, y), 0);
		self.heap.push(Reverse(Node { dist: 0, x, y }));
	}

	pub(super) fn step(&mut self, core: &mut Core) {
		// Settle exactly one node, skipping stale heap duplicates
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
			step: cur.dist,
			distance: cur.dist as f32,
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

			let nd = cur.dist + 1;
			if self.dist.get(&nk).is_none_or(|&old| nd < old) {
				self.dist.insert(nk, nd);
				self.parent.insert(nk, ck);
				self.heap.push(Reverse(Node {
					dist: nd,
					x: nx,
					y: ny,
				}));
			}
		}
	}
}
