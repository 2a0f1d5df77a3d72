//! All-pairs search on a corridor-compressed graph.
//!
//! The grid is first compressed: every passable cell that is an endpoint,
//! a junction or a dead end becomes a node, and the straight degree-2
//! corridors between nodes become weighted edges that remember the cells
//! they cover. Floyd-Warshall then runs once over the compressed graph,
//! the node path is expanded back to cells, and the remaining ticks
//! animate along that path one cell at a time.

use std::collections::HashMap;

use tracing::debug;

use crate::{error::Error, maze::Maze};

use super::{Core, PointInfo, SCAN_DIRS};

/// Largest corridor graph Floyd-Warshall will accept
const NODE_CAP: usize = 1_800;
/// Cap on the combined size of the `dist` and `next` matrices
const MEMORY_CAP: usize = 512 * 1024 * 1024;

const INF: u32 = u32::MAX / 2;
const NO_HOP: u32 = u32::MAX;

pub(super) struct Floyd {
	computed: bool,
	cells: Vec<(u32, u32)>,
	anim: usize,
}

impl Floyd {
	pub(super) fn new() -> Self {
		Self {
			computed: false,
			cells: Vec::new(),
			anim: 0,
		}
	}

	pub(super) fn seed(&mut self) {
		self.computed = false;
		self.cells.clear();
		self.anim = 0;
	}

	pub(super) fn step(&mut self, core: &mut Core) {
		if !self.computed {
			self.computed = true;

			let (ox, oy) = core.origin;
			core.way.push(PointInfo::at(ox, oy));

			match compute(core) {
				Ok(cells) => self.cells = cells,
				Err(error) => core.fail(error),
			}
			return;
		}

		// Animation phase: append the precomputed path one cell per tick
		let Some(&(x, y)) = self.cells.get(self.anim) else {
			core.fail(Error::FloydReconstruct);
			return;
		};

		core.way.push(PointInfo {
			x,
			y,
			step: self.anim as u32,
			distance: 0.0,
		});
		self.anim += 1;

		if self.anim == self.cells.len() {
			let route = self
				.cells
				.iter()
				.enumerate()
				.map(|(step, &(x, y))| PointInfo {
					x,
					y,
					step: step as u32,
					distance: 0.0,
				})
				.collect();
			core.complete(route);
		}
	}
}

/// Run the three precomputation phases: compression, Floyd-Warshall and
/// path expansion
fn compute(core: &Core) -> Result<Vec<(u32, u32)>, Error> {
	let maze = &core.maze;

	// Phase 1a: node collection
	let mut ids = HashMap::new();
	let mut nodes = Vec::new();

	for y in 0..maze.height() {
		for x in 0..maze.width() {
			if maze.is_wall(x as i32, y as i32) {
				continue;
			}

			let special = (x, y) == core.origin || (x, y) == core.target;
			if special || walk_degree(maze, x, y) != 2 {
				ids.insert(maze.key(x, y), nodes.len());
				nodes.push((x, y));
			}
		}
	}

	let n = nodes.len();
	if n > NODE_CAP {
		return Err(Error::FloydGraphTooLarge { n, limit: NODE_CAP });
	}

	let (ox, oy) = core.origin;
	let (tx, ty) = core.target;
	let &s = ids.get(&maze.key(ox, oy)).ok_or(Error::FloydNodeMap)?;
	let &e = ids.get(&maze.key(tx, ty)).ok_or(Error::FloydNodeMap)?;

	if s == e {
		return Ok(vec![core.origin]);
	}

	// Phase 1b: corridor walks; parallel corridors keep the shortest
	let mut corridors: HashMap<(usize, usize), Vec<(u32, u32)>> = HashMap::new();
	let mut edges: HashMap<(usize, usize), u32> = HashMap::new();

	for (u, &(ux, uy)) in nodes.iter().enumerate() {
		for (dx, dy) in SCAN_DIRS {
			let Some((v, cells)) = walk_corridor(maze, &ids, (ux, uy), (dx, dy)) else {
				continue;
			};

			if v == u {
				continue;
			}

			let weight = (cells.len() - 1) as u32;
			if edges.get(&(u, v)).is_none_or(|&old| weight < old) {
				let mut reversed = cells.clone();
				reversed.reverse();

				edges.insert((u, v), weight);
				edges.insert((v, u), weight);
				corridors.insert((u, v), cells);
				corridors.insert((v, u), reversed);
			}
		}
	}

	debug!(nodes = n, edges = edges.len(), "corridor graph compressed");

	// Phase 2: Floyd-Warshall over fallibly allocated flat matrices
	let entries = n
		.checked_mul(n)
		.filter(|&nn| nn.saturating_mul(2 * std::mem::size_of::<u32>()) <= MEMORY_CAP)
		.ok_or(Error::FloydMemoryTooLarge)?;

	let mut dist: Vec<u32> = Vec::new();
	dist.try_reserve_exact(entries)
		.map_err(|_| Error::FloydMemoryTooLarge)?;
	dist.resize(entries, INF);

	let mut next: Vec<u32> = Vec::new();
	next.try_reserve_exact(entries)
		.map_err(|_| Error::FloydMemoryTooLarge)?;
	next.resize(entries, NO_HOP);

	for i in 0..n {
		dist[i * n + i] = 0;
		next[i * n + i] = i as u32;
	}

	for (&(u, v), &weight) in &edges {
		if weight < dist[u * n + v] {
			dist[u * n + v] = weight;
			next[u * n + v] = v as u32;
		}
	}

	for k in 0..n {
		if core.cancelled() {
			return Err(Error::Cancelled);
		}

		for i in 0..n {
			let dik = dist[i * n + k];
			if dik >= INF {
				continue;
			}

			for j in 0..n {
				let dkj = dist[k * n + j];
				if dkj >= INF {
					continue;
				}

				let nd = dik + dkj;
				if nd < dist[i * n + j] {
					dist[i * n + j] = nd;
					next[i * n + j] = next[i * n + k];
				}
			}
		}
	}

	if dist[s * n + e] >= INF {
		return Err(Error::NoPath);
	}

	// Phase 3a: node path via the next-hop matrix
	let mut node_path = vec![s];
	let mut cur = s;

	while cur != e {
		let hop = next[cur * n + e];
		if hop == NO_HOP || node_path.len() > n {
			return Err(Error::FloydReconstruct);
		}

		cur = hop as usize;
		node_path.push(cur);
	}

	// Phase 3b: expand node pairs back to cells, dropping the junction
	// cell that each seam would otherwise duplicate
	let mut cells = Vec::new();
	for pair in node_path.windows(2) {
		let corridor = corridors
			.get(&(pair[0], pair[1]))
			.ok_or(Error::FloydCorridor)?;
		let seam = usize::from(!cells.is_empty());
		cells.extend_from_slice(&corridor[seam..]);
	}

	Ok(cells)
}

/// Number of passable 4-neighbours of `(x, y)`
fn walk_degree(maze: &Maze, x: u32, y: u32) -> usize {
	SCAN_DIRS
		.iter()
		.filter(|(dx, dy)| maze.is_open(x as i32 + dx, y as i32 + dy))
		.count()
}

/// Follow the corridor leaving `from` in direction `(dx, dy)` until the
/// next node, collecting every cell on the way (both endpoints included)
fn walk_corridor(
	maze: &Maze,
	ids: &HashMap<u32, usize>,
	from: (u32, u32),
	(dx, dy): (i32, i32),
) -> Option<(usize, Vec<(u32, u32)>)> {
	let mut prev = (from.0 as i32, from.1 as i32);
	let mut cur = (prev.0 + dx, prev.1 + dy);

	if !maze.is_open(cur.0, cur.1) {
		return None;
	}

	let mut cells = vec![from, (cur.0 as u32, cur.1 as u32)];
	let limit = (maze.width() * maze.height()) as usize;

	loop {
		if let Some(&v) = ids.get(&maze.key(cur.0 as u32, cur.1 as u32)) {
			return Some((v, cells));
		}

		// Degree-2 cell: the single open neighbour that is not where we
		// came from
		let next = SCAN_DIRS
			.iter()
			.map(|(sx, sy)| (cur.0 + sx, cur.1 + sy))
			.find(|&cand| cand != prev && maze.is_open(cand.0, cand.1))?;

		prev = cur;
		cur = next;
		cells.push((cur.0 as u32, cur.1 as u32));

		if cells.len() > limit {
			return None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::tests::{cells, reference_maze, run};
	use super::super::{Explorer, State, Strategy};
	use crate::{
		error::Error,
		maze::{Maze, CELL_OPEN, CELL_WALL},
	};

	#[test]
	fn finds_the_corridor_route() {
		let mut explorer = Explorer::new(reference_maze(), Strategy::Floyd);
		explorer.set_route((1, 1), (1, 3));
		run(&mut explorer);

		assert!(explorer.found());
		assert_eq!(
			cells(explorer.path()),
			vec![(1, 1), (2, 1), (3, 1), (3, 2), (3, 3), (2, 3), (1, 3)]
		);
		// The animation walked the whole path plus the compute tick
		assert_eq!(explorer.way().len(), explorer.path().len() + 1);
	}

	#[test]
	fn start_equals_end_passes_through_the_compute_tick() {
		let mut explorer = Explorer::new(reference_maze(), Strategy::Floyd);
		explorer.set_route((1, 1), (1, 1));
		run(&mut explorer);

		assert!(explorer.found());
		assert_eq!(cells(explorer.path()), vec![(1, 1)]);
		assert_eq!(explorer.way().len(), 2);
	}

	#[test]
	fn rejects_a_graph_over_the_node_cap() {
		// An open field makes almost every interior cell a junction
		let mut maze = Maze::filled(71, 71, CELL_OPEN, 0);
		for i in 0..71 {
			maze.set(i, 0, CELL_WALL);
			maze.set(i, 70, CELL_WALL);
			maze.set(0, i, CELL_WALL);
			maze.set(70, i, CELL_WALL);
		}

		let mut explorer = Explorer::new(maze, Strategy::Floyd);
		explorer.set_route((1, 1), (69, 69));
		run(&mut explorer);

		assert!(!explorer.found());
		assert!(matches!(
			explorer.error(),
			Some(Error::FloydGraphTooLarge { limit: 1_800, .. })
		));
	}

	#[test]
	fn unreachable_end_reports_no_path() {
		let maze = Maze::from_grid(&[
			&[1, 1, 1, 1, 1][..],
			&[1, 0, 1, 0, 1][..],
			&[1, 1, 1, 1, 1][..],
		])
		.unwrap();

		let mut explorer = Explorer::new(maze, Strategy::Floyd);
		explorer.set_route((1, 1), (3, 1));
		run(&mut explorer);

		assert_eq!(explorer.state(), State::End);
		assert_eq!(explorer.error(), Some(&Error::NoPath));
	}

	#[test]
	fn agrees_with_bfs_on_a_generated_maze() {
		let maze = crate::generate::build(crate::maze::MazeSize::Standard, 11);
		let (ex, ey) = maze.finish();

		let mut bfs = Explorer::new(maze.clone(), Strategy::Bfs);
		bfs.set_route((1, 1), (ex as i32, ey as i32));
		run(&mut bfs);

		let mut floyd = Explorer::new(maze, Strategy::Floyd);
		floyd.set_route((1, 1), (ex as i32, ey as i32));
		run(&mut floyd);

		assert!(bfs.found() && floyd.found());
		assert_eq!(bfs.path().len(), floyd.path().len());
	}
}
