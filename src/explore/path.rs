//! Parent-map back-walks that turn a finished search into an ordered
//! start-to-end path.

use std::collections::HashMap;

use crate::maze::Maze;

use super::PointInfo;

/// Bound on back-walk length; a longer walk means the parent map is
/// corrupted and reconstruction gives up with an empty path
const WALK_LIMIT: usize = 5_000_000;

/// Rebuild the path from a 2-D parent map
///
/// Walks `end → parent → … → start` and reverses. `start == end` yields
/// a one-element path; an end with no parent entry yields an empty one.
pub(super) fn rebuild(
	maze: &Maze,
	parent: &HashMap<u32, u32>,
	start: (u32, u32),
	end: (u32, u32),
) -> Vec<PointInfo> {
	let keys = walk_back(parent, maze.key(start.0, start.1), maze.key(end.0, end.1));
	points(keys.into_iter().map(|k| maze.cell_of(k)))
}

/// Rebuild the path from a 3-D parent map, projecting the layered keys
/// down to plain cells
pub(super) fn rebuild_layered(
	maze: &Maze,
	parent: &HashMap<u32, u32>,
	start_key: u32,
	end_key: u32,
) -> Vec<PointInfo> {
	let keys = walk_back(parent, start_key, end_key);
	points(keys.into_iter().map(|k| maze.cell_of3(k)))
}

fn walk_back(parent: &HashMap<u32, u32>, start_key: u32, end_key: u32) -> Vec<u32> {
	let mut keys = Vec::new();
	let mut cur = end_key;

	loop {
		keys.push(cur);

		if cur == start_key {
			break;
		}

		match parent.get(&cur) {
			Some(&p) => cur = p,
			None => return Vec::new(),
		}

		if keys.len() > WALK_LIMIT {
			return Vec::new();
		}
	}

	keys.reverse();
	keys
}

fn points(cells: impl Iterator<Item = (u32, u32)>) -> Vec<PointInfo> {
	cells
		.enumerate()
		.map(|(step, (x, y))| PointInfo {
			x,
			y,
			step: step as u32,
			distance: 0.0,
		})
		.collect()
}
