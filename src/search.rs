//! The search driver: runs one strategy (or all six in lock-step) over a
//! maze snapshot, paints exploration and path artifacts onto a render
//! copy, throttles frame emission and collects comparative statistics.
//!
//! The driver owns its render maze and its explorers exclusively; the
//! only shared state is the cancellation flag, and no lock is held across
//! the animation callback.

use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	thread,
	time::Duration,
};

use tracing::{debug, info};

use crate::{
	error::Error,
	explore::{Explorer, PointInfo, State, Strategy, K_MAX},
	maze::{Maze, CELL_BROKEN_WALL, CELL_OPEN, CELL_WALL},
};

/// Tick-guard multiplier for a single strategy
const TICK_GUARD_SINGLE: u32 = 32;
/// Tick-guard multiplier when all strategies run together
const TICK_GUARD_ALL: u32 = 64;

/// Everything one search run needs besides the maze itself
#[derive(Debug, Clone)]
pub struct SearchOptions {
	pub strategy: Strategy,
	pub start: (i32, i32),
	pub end: (i32, i32),
	/// Newly visited cells between frame emissions; zero is coerced to 1
	pub update_every: u32,
	/// Sleep between frame emissions
	pub delay: Duration,
	/// Grid the render maze starts from, when the caller wants painting
	/// over something other than the input snapshot
	pub baseline: Option<Maze>,
	/// Wall budget handed to the breaking strategy
	pub break_limit: u32,
}

impl SearchOptions {
	/// Options for `strategy` from `start` to `end`, with per-tick
	/// emission, no delay and the default wall budget
	#[must_use]
	pub const fn new(strategy: Strategy, start: (i32, i32), end: (i32, i32)) -> Self {
		Self {
			strategy,
			start,
			end,
			update_every: 1,
			delay: Duration::ZERO,
			baseline: None,
			break_limit: K_MAX,
		}
	}
}

/// Comparative record for one strategy
#[derive(Debug, Clone)]
pub struct StrategyStats {
	/// Cells on the reconstructed path, `-1` when no path was found
	pub path_len: i32,
	/// Length of the exploration trajectory
	pub visited: i32,
	/// Trajectory index of the first arrival at the end cell, `-1` when
	/// the end was never reached
	pub found_at: i32,
	/// Placement 1..=6 in all-strategies mode, 0 otherwise
	pub rank: i32,
	/// The reconstructed path, empty when not found
	pub path: Vec<PointInfo>,
}

impl Default for StrategyStats {
	fn default() -> Self {
		Self {
			path_len: -1,
			visited: 0,
			found_at: -1,
			rank: 0,
			path: Vec::new(),
		}
	}
}

/// Per-strategy statistics, indexed by [`Strategy::COMPARED`] order
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
	pub strategies: [StrategyStats; 6],
}

impl SearchStats {
	/// The row for one of the six compared strategies
	///
	/// # Panics
	/// Panics when asked for [`Strategy::All`], which has no row of its
	/// own.
	#[must_use]
	pub fn row(&self, strategy: Strategy) -> &StrategyStats {
		&self.strategies[strategy.index()]
	}
}

/// Drive a search over `maze` and animate it through `on_frame`
///
/// The callback receives the driver's render maze: the input (or the
/// explicit baseline) with visited cells and, at the end, final paths
/// painted in using the per-strategy cell codes. It is invoked every
/// `update_every` newly visited cells, once more after termination, and
/// once after an observed cancellation. `stats` is rewritten on every
/// call and is filled even when the search fails.
///
/// # Errors
/// Returns the explorer's terminal error (walls or range on the route,
/// an exhausted frontier, a Floyd rejection, cancellation) or the
/// driver's own step-limit guard. In all-strategies mode a run counts as
/// success if at least one child found a path; individual failures stay
/// visible in `stats`.
#[tracing::instrument(skip_all, fields(strategy = %opts.strategy))]
pub fn search(
	maze: &Maze,
	opts: &SearchOptions,
	cancel: Option<&Arc<AtomicBool>>,
	mut on_frame: impl FnMut(&Maze),
	stats: &mut SearchStats,
) -> Result<(), Error> {
	*stats = SearchStats::default();

	if maze.width() == 0 || maze.height() == 0 {
		return Err(Error::EmptyGrid);
	}

	if !maze.in_bounds(opts.start.0, opts.start.1)
		|| !maze.in_bounds(opts.end.0, opts.end.1)
	{
		return Err(Error::OutOfRange);
	}

	let update_every = opts.update_every.max(1) as usize;
	let guard = maze.width()
		* maze.height()
		* if opts.strategy == Strategy::All {
			TICK_GUARD_ALL
		} else {
			TICK_GUARD_SINGLE
		};

	let mut explorer =
		Explorer::with_break_limit(maze.clone(), opts.strategy, opts.break_limit);
	explorer.set_route(opts.start, opts.end);
	if let Some(flag) = cancel {
		explorer.set_cancel(Arc::clone(flag));
	}
	explorer.reset();

	let mut render = opts.baseline.clone().unwrap_or_else(|| maze.clone());

	let lanes = if opts.strategy == Strategy::All { 6 } else { 1 };
	let mut painted = vec![0usize; lanes];
	let mut since_emit = 0;
	let mut ticks = 0u32;
	let mut verdict = None;

	while explorer.state() != State::End {
		if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
			verdict = Some(Error::Cancelled);
			break;
		}

		ticks += 1;
		if ticks > guard {
			verdict = Some(Error::StepLimit);
			break;
		}

		explorer.update();
		since_emit += paint_new(&mut render, &explorer, opts.strategy, &mut painted);

		if since_emit >= update_every {
			since_emit = 0;
			on_frame(&render);

			if !opts.delay.is_zero() {
				thread::sleep(opts.delay);
			}
		}
	}

	if verdict.is_none() {
		paint_paths(&mut render, &explorer, opts.strategy);
	}

	// The final frame is emitted even after cancellation or failure
	on_frame(&render);

	fill_stats(stats, &explorer, opts.strategy);

	let outcome = match verdict.or_else(|| explorer.error().cloned()) {
		Some(error) => Err(error),
		None => Ok(()),
	};

	match &outcome {
		Ok(()) => info!(ticks, "search done"),
		Err(error) => debug!(ticks, %error, "search ended early"),
	}

	outcome
}

/// Paint every trajectory cell appended since the last tick, returning
/// how many there were
fn paint_new(
	render: &mut Maze,
	explorer: &Explorer,
	strategy: Strategy,
	painted: &mut [usize],
) -> usize {
	if strategy == Strategy::All {
		explorer
			.children()
			.iter()
			.zip(painted.iter_mut())
			.map(|(child, done)| {
				paint_lane(render, child.strategy().visited_code(), child.way(), done, true)
			})
			.sum()
	} else {
		paint_lane(
			render,
			strategy.visited_code(),
			explorer.way(),
			&mut painted[0],
			false,
		)
	}
}

/// Paint one strategy's fresh trajectory suffix with its visited code
///
/// Walls are never overwritten. With `first_come` set (all-strategies
/// mode) already painted cells keep the color of the earliest strategy
/// that reached them.
fn paint_lane(
	render: &mut Maze,
	code: u8,
	way: &[PointInfo],
	painted: &mut usize,
	first_come: bool,
) -> usize {
	let fresh = &way[*painted..];
	*painted = way.len();

	for p in fresh {
		let cur = render.get(p.x, p.y);

		if cur == CELL_WALL || (first_come && cur != CELL_OPEN) {
			continue;
		}

		render.set(p.x, p.y, code);
	}

	fresh.len()
}

/// Paint the reconstructed paths of every successful strategy
fn paint_paths(render: &mut Maze, explorer: &Explorer, strategy: Strategy) {
	if strategy == Strategy::All {
		for child in explorer.children() {
			if child.found() {
				paint_route(render, child.strategy(), child.path());
			}
		}
	} else if explorer.found() {
		paint_route(render, strategy, explorer.path());
	}
}

fn paint_route(render: &mut Maze, strategy: Strategy, route: &[PointInfo]) {
	let code = strategy.path_code();

	for p in route {
		let cur = render.get(p.x, p.y);

		if cur == CELL_WALL || cur == CELL_BROKEN_WALL {
			// Only the wall-breaking strategy may mark a wall, and only
			// with the overlay code; the wall is never carved
			if strategy == Strategy::BfsPlus && cur == CELL_WALL {
				render.set(p.x, p.y, CELL_BROKEN_WALL);
			}
			continue;
		}

		// A cell already claimed by an earlier strategy's path keeps it
		if (2..=7).contains(&cur) {
			continue;
		}

		render.set(p.x, p.y, code);
	}
}

fn fill_stats(stats: &mut SearchStats, explorer: &Explorer, strategy: Strategy) {
	if strategy == Strategy::All {
		for child in explorer.children() {
			fill_row(&mut stats.strategies[child.strategy().index()], child);
		}
		rank_rows(stats);
	} else {
		fill_row(&mut stats.strategies[strategy.index()], explorer);
	}
}

fn fill_row(row: &mut StrategyStats, explorer: &Explorer) {
	row.visited = explorer.way().len() as i32;

	if explorer.found() {
		row.path_len = explorer.path().len() as i32;
		row.path = explorer.path().to_vec();

		let (_, (ex, ey)) = explorer.route();
		row.found_at = explorer
			.way()
			.iter()
			.position(|p| (p.x as i32, p.y as i32) == (ex, ey))
			.map_or(-1, |i| i as i32);
	}
}

/// Order the six rows by first-hit tick, then path length, then visited
/// count, then fixed strategy index; absent values sort last
fn rank_rows(stats: &mut SearchStats) {
	let mut order: Vec<usize> = (0..stats.strategies.len()).collect();

	order.sort_by_key(|&i| {
		let row = &stats.strategies[i];
		(sortable(row.found_at), sortable(row.path_len), row.visited, i)
	});

	for (place, &i) in order.iter().enumerate() {
		stats.strategies[i].rank = place as i32 + 1;
	}
}

const fn sortable(value: i32) -> i64 {
	if value < 0 {
		i64::MAX
	} else {
		value as i64
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	};

	use super::{search, SearchOptions, SearchStats};
	use crate::{
		error::Error,
		explore::Strategy,
		generate,
		maze::{Maze, MazeSize, CELL_BROKEN_WALL, CELL_WALL},
	};

	fn reference_maze() -> Maze {
		Maze::from_grid(&[
			&[1, 1, 1, 1, 1][..],
			&[1, 0, 0, 0, 1][..],
			&[1, 1, 1, 0, 1][..],
			&[1, 0, 0, 0, 1][..],
			&[1, 1, 1, 1, 1][..],
		])
		.unwrap()
	}

	/// Walls in the input may only ever show up as walls (or, for the
	/// breaking strategy, as the overlay marker) in a render frame.
	fn assert_walls_preserved(input: &Maze, frame: &Maze, allow_overlay: bool) {
		for y in 0..input.height() {
			for x in 0..input.width() {
				if input.get(x, y) == CELL_WALL {
					let rendered = frame.get(x, y);
					let ok = rendered == CELL_WALL
						|| (allow_overlay && rendered == CELL_BROKEN_WALL);
					assert!(ok, "wall at ({x}, {y}) became {rendered}");
				}
			}
		}
	}

	#[test]
	fn emits_one_frame_per_visited_cell_plus_a_final() {
		let maze = reference_maze();
		let opts = SearchOptions::new(Strategy::Bfs, (1, 1), (1, 3));
		let mut stats = SearchStats::default();
		let mut frames = 0;

		search(&maze, &opts, None, |_| frames += 1, &mut stats).unwrap();

		let visited = stats.row(Strategy::Bfs).visited;
		assert!(visited > 0);
		assert_eq!(frames, visited + 1);
	}

	#[test]
	fn zero_update_every_is_coerced() {
		let maze = reference_maze();
		let mut opts = SearchOptions::new(Strategy::Bfs, (1, 1), (1, 3));
		opts.update_every = 0;
		let mut stats = SearchStats::default();
		let mut frames = 0;

		search(&maze, &opts, None, |_| frames += 1, &mut stats).unwrap();
		assert!(frames > 0);
	}

	#[test]
	fn every_strategy_preserves_walls() {
		let maze = generate::build(MazeSize::Standard, 0);
		let (ex, ey) = maze.finish();

		for strategy in Strategy::COMPARED {
			let mut opts =
				SearchOptions::new(strategy, (1, 1), (ex as i32, ey as i32));
			opts.update_every = 500;
			let mut stats = SearchStats::default();
			let input = maze.clone();

			search(
				&maze,
				&opts,
				None,
				|frame| {
					assert_walls_preserved(
						&input,
						frame,
						strategy == Strategy::BfsPlus,
					);
				},
				&mut stats,
			)
			.unwrap();

			assert!(stats.row(strategy).path_len > 0, "{strategy}");
		}
	}

	#[test]
	fn breaking_paths_mark_walls_with_the_overlay_code() {
		let maze = reference_maze();
		let opts = SearchOptions::new(Strategy::BfsPlus, (1, 1), (1, 3));
		let mut stats = SearchStats::default();
		let mut last = None;

		search(&maze, &opts, None, |frame| last = Some(frame.clone()), &mut stats)
			.unwrap();

		let last = last.unwrap();
		assert_eq!(last.get(1, 2), CELL_BROKEN_WALL);
		assert_eq!(stats.row(Strategy::BfsPlus).path_len, 3);
	}

	#[test]
	fn single_mode_paints_path_over_visited() {
		let maze = reference_maze();
		let opts = SearchOptions::new(Strategy::Bfs, (1, 1), (1, 3));
		let mut stats = SearchStats::default();
		let mut last = None;

		search(&maze, &opts, None, |frame| last = Some(frame.clone()), &mut stats)
			.unwrap();

		let last = last.unwrap();
		for p in &stats.row(Strategy::Bfs).path {
			assert_eq!(last.get(p.x, p.y), Strategy::Bfs.path_code());
		}
	}

	#[test]
	fn empty_grid_and_bad_routes_are_rejected() {
		let maze = reference_maze();
		let mut stats = SearchStats::default();

		let opts = SearchOptions::new(Strategy::Bfs, (1, 1), (9, 9));
		assert_eq!(
			search(&maze, &opts, None, |_| {}, &mut stats),
			Err(Error::OutOfRange)
		);

		let opts = SearchOptions::new(Strategy::Bfs, (1, 1), (2, 2));
		assert_eq!(
			search(&maze, &opts, None, |_| {}, &mut stats),
			Err(Error::EndpointIsWall)
		);
	}

	#[test]
	fn cancellation_still_emits_a_final_frame() {
		let maze = generate::build(MazeSize::Standard, 0);
		let (ex, ey) = maze.finish();
		let mut opts =
			SearchOptions::new(Strategy::Floyd, (1, 1), (ex as i32, ey as i32));
		opts.update_every = 1;

		let cancel = Arc::new(AtomicBool::new(false));
		let flag = Arc::clone(&cancel);
		let mut stats = SearchStats::default();
		let mut frames = 0;

		let result = search(
			&maze,
			&opts,
			Some(&cancel),
			|_| {
				// Flip the flag as soon as the first frame arrives
				frames += 1;
				flag.store(true, Ordering::Relaxed);
			},
			&mut stats,
		);

		assert_eq!(result, Err(Error::Cancelled));
		assert!(frames >= 2);
		assert_eq!(stats.row(Strategy::Floyd).path_len, -1);
		assert!(stats.row(Strategy::Floyd).visited >= 0);
	}

	#[test]
	fn all_mode_compares_the_six_strategies() {
		let maze = generate::build(MazeSize::Standard, 0);
		let (ex, ey) = maze.finish();
		let mut opts = SearchOptions::new(Strategy::All, (1, 1), (ex as i32, ey as i32));
		opts.update_every = 2000;
		let mut stats = SearchStats::default();

		search(&maze, &opts, None, |_| {}, &mut stats).unwrap();

		for strategy in Strategy::COMPARED {
			assert!(stats.row(strategy).visited > 0, "{strategy}");
		}

		let bfs = stats.row(Strategy::Bfs);
		let astar = stats.row(Strategy::AStar);
		assert_eq!(bfs.path_len, astar.path_len);
		assert!(astar.visited <= bfs.visited);

		let mut ranks: Vec<_> =
			stats.strategies.iter().map(|row| row.rank).collect();
		ranks.sort_unstable();
		assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
	}

	#[test]
	fn all_mode_paints_first_come_wins() {
		let maze = generate::build(MazeSize::Standard, 1);
		let (ex, ey) = maze.finish();
		let mut opts = SearchOptions::new(Strategy::All, (1, 1), (ex as i32, ey as i32));
		opts.update_every = 5000;
		let mut stats = SearchStats::default();
		let mut last = None;

		search(&maze, &opts, None, |frame| last = Some(frame.clone()), &mut stats)
			.unwrap();

		// The start cell lies on every found path; the first child to
		// paint it owns it, so it must end up under a path code
		let code = last.unwrap().get(1, 1);
		assert!((2..=7).contains(&code), "start cell painted {code}");
	}

	#[test]
	fn found_at_is_the_last_trajectory_index() {
		let maze = reference_maze();
		let opts = SearchOptions::new(Strategy::Bfs, (1, 1), (1, 3));
		let mut stats = SearchStats::default();

		search(&maze, &opts, None, |_| {}, &mut stats).unwrap();

		let row = stats.row(Strategy::Bfs);
		assert_eq!(row.found_at, row.visited - 1);
	}

	#[test]
	fn baseline_replaces_the_render_start() {
		let maze = reference_maze();
		let baseline = Maze::filled(5, 5, 0, 0);
		let mut opts = SearchOptions::new(Strategy::Bfs, (1, 1), (1, 3));
		opts.baseline = Some(baseline);
		let mut stats = SearchStats::default();
		let mut last = None;

		search(&maze, &opts, None, |frame| last = Some(frame.clone()), &mut stats)
			.unwrap();

		// Walls of the input never appear: the render started blank
		let last = last.unwrap();
		assert!(last.cells().iter().all(|&c| c != CELL_WALL));
	}
}
