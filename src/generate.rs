//! Maze generation: randomized depth-first carving, room insertion and
//! braiding.
//!
//! The generator only ever writes the two base cell codes. After it
//! returns, the exterior ring is solid wall, both implicit endpoints are
//! passable, every passable cell is reachable from the start, and
//! braiding has opened enough extra walls that more than one route exists
//! between most cell pairs.

use std::{
	sync::atomic::{AtomicBool, Ordering},
	thread,
	time::Duration,
};

use tracing::debug;

use crate::{
	maze::{Maze, MazeSize, CELL_OPEN, CELL_WALL},
	util::{Rand, TurboRand},
};

/// Number of rooms carved into a standard maze
const ROOMS: u32 = 10;
/// Largest half-extent of a room along one axis
const ROOM_MAX_HALF: u32 = 3;
/// Attempts at picking a passable room center or a room border opening
const ROOM_TRIES: u32 = 50;
/// Probability that braiding opens an eligible wall
const BRAID_RATE: f64 = 0.06;

/// Pacing for animated generation: how many carved cells between snapshot
/// emissions and how long to sleep after each one.
#[derive(Debug, Clone, Copy)]
pub struct BuildPacing {
	pub update_every: u32,
	pub delay: Duration,
}

/// Generate a maze of the given size from a seed
#[must_use]
pub fn build(size: MazeSize, seed: i32) -> Maze {
	build_with(size, seed, None, None, |_| {})
}

/// Generate a maze, emitting snapshots of the partially carved grid
///
/// `on_step` is called at least once before carving starts and once with
/// the finished maze; with `pacing` it is also called every
/// `update_every` carved cells, sleeping `delay` in between. If `cancel`
/// is observed set, the partially carved maze is returned as-is.
#[tracing::instrument(skip(pacing, cancel, on_step))]
pub fn build_with(
	size: MazeSize,
	seed: i32,
	pacing: Option<BuildPacing>,
	cancel: Option<&AtomicBool>,
	mut on_step: impl FnMut(&Maze),
) -> Maze {
	let side = size.side();
	let mut maze = Maze::filled(side, side, CELL_WALL, seed);
	let rng = Rand::with_seed(seed);

	on_step(&maze);

	let cancelled =
		|| cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));

	let mut carved = 0u32;
	let mut since_emit = 0u32;
	let mut steps = 0u32;

	// Recursive backtracker over the distance-2 lattice
	maze.set(1, 1, CELL_OPEN);
	carved += 1;
	let mut stack = vec![(1u32, 1u32)];

	while let Some(&(x, y)) = stack.last() {
		if cancelled() {
			debug!("generation cancelled at {carved} carved cells");
			return maze;
		}

		let mut open = [(0i32, 0i32); 4];
		let mut count = 0;
		for (dx, dy) in [(2i32, 0i32), (-2, 0), (0, 2), (0, -2)] {
			let nx = x as i32 + dx;
			let ny = y as i32 + dy;
			if in_interior(nx, ny, side) && maze.is_wall(nx, ny) {
				open[count] = (dx, dy);
				count += 1;
			}
		}

		if count == 0 {
			// All neighbours carved, backtrack
			stack.pop();
			continue;
		}

		let (dx, dy) = open[rng.usize(0..count)];
		let bx = (x as i32 + dx / 2) as u32;
		let by = (y as i32 + dy / 2) as u32;
		let nx = (x as i32 + dx) as u32;
		let ny = (y as i32 + dy) as u32;

		maze.set(bx, by, CELL_OPEN);
		maze.set(nx, ny, CELL_OPEN);
		carved += 2;
		since_emit += 2;
		stack.push((nx, ny));

		if let Some(p) = pacing {
			if p.update_every > 0 && since_emit >= p.update_every {
				since_emit = 0;
				on_step(&maze);

				if !p.delay.is_zero() {
					thread::sleep(p.delay);
				}
			}
		}

		steps += 1;
		if steps % 512 == 0 {
			debug!(
				"carving - {:.2}%",
				100.0 * f64::from(carved) / f64::from(side * side)
			);
		}
	}

	carve_rooms(&mut maze, &rng, side);
	braid(&mut maze, &rng, side);

	// The endpoints are part of the contract regardless of what carving did
	maze.set(1, 1, CELL_OPEN);
	maze.set(side - 2, side - 2, CELL_OPEN);

	debug!(open = maze.open_cells(), "generation done");
	on_step(&maze);

	maze
}

/// Whether `(x, y)` lies strictly inside the exterior wall ring
const fn in_interior(x: i32, y: i32, side: u32) -> bool {
	x >= 1 && y >= 1 && x < side as i32 - 1 && y < side as i32 - 1
}

/// Carve rectangular rooms centered on already-passable cells
///
/// Centers are snapped to odd coordinates so rooms line up with the
/// carved lattice. A room whose border touches no outside passable cell
/// gets one opening carved outward so it is never a sealed pocket.
fn carve_rooms(maze: &mut Maze, rng: &Rand, side: u32) {
	for _ in 0..ROOMS {
		let Some((cx, cy)) = random_open_cell(maze, rng, side) else {
			continue;
		};

		// Snap to odd coordinates
		let cx = cx - (1 - cx % 2);
		let cy = cy - (1 - cy % 2);

		let hx = rng.u32(1..=ROOM_MAX_HALF);
		let hy = rng.u32(1..=ROOM_MAX_HALF);

		let x0 = cx.saturating_sub(hx).max(1);
		let y0 = cy.saturating_sub(hy).max(1);
		let x1 = (cx + hx).min(side - 2);
		let y1 = (cy + hy).min(side - 2);

		for y in y0..=y1 {
			for x in x0..=x1 {
				maze.set(x, y, CELL_OPEN);
			}
		}

		if !touches_outside_open(maze, x0, y0, x1, y1) {
			open_room_border(maze, rng, side, x0, y0, x1, y1);
		}
	}
}

/// Pick a random passable interior cell, or `None` if unlucky
fn random_open_cell(maze: &Maze, rng: &Rand, side: u32) -> Option<(u32, u32)> {
	for _ in 0..ROOM_TRIES {
		let x = rng.u32(1..side - 1);
		let y = rng.u32(1..side - 1);
		if maze.get(x, y) == CELL_OPEN {
			return Some((x, y));
		}
	}

	None
}

/// Whether any cell on the ring just outside the rectangle is passable
fn touches_outside_open(maze: &Maze, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
	let (x0, y0, x1, y1) = (x0 as i32, y0 as i32, x1 as i32, y1 as i32);

	(x0 - 1..=x1 + 1).any(|x| maze.is_open(x, y0 - 1) || maze.is_open(x, y1 + 1))
		|| (y0 - 1..=y1 + 1).any(|y| maze.is_open(x0 - 1, y) || maze.is_open(x1 + 1, y))
}

/// Carve one opening from the room border towards a passable cell beyond
/// the surrounding wall, trying up to [`ROOM_TRIES`] candidate borders
fn open_room_border(
	maze: &mut Maze,
	rng: &Rand,
	side: u32,
	x0: u32,
	y0: u32,
	x1: u32,
	y1: u32,
) {
	for _ in 0..ROOM_TRIES {
		let (bx, by, dx, dy) = match rng.u32(0..4) {
			0 => (rng.u32(x0..=x1), y0, 0i32, -1i32),
			1 => (rng.u32(x0..=x1), y1, 0, 1),
			2 => (x0, rng.u32(y0..=y1), -1, 0),
			_ => (x1, rng.u32(y0..=y1), 1, 0),
		};

		let wx = bx as i32 + dx;
		let wy = by as i32 + dy;
		let px = bx as i32 + dx * 2;
		let py = by as i32 + dy * 2;

		if in_interior(wx, wy, side) && maze.is_open(px, py) {
			maze.set(wx as u32, wy as u32, CELL_OPEN);
			return;
		}
	}
}

/// Open walls that sit orthogonally between two passable cells
///
/// A wall is eligible when exactly one of its horizontal or vertical
/// neighbour pairs is open on both sides; each eligible wall opens with
/// an independent [`BRAID_RATE`] chance, injecting the cycles the route
/// comparison relies on.
fn braid(maze: &mut Maze, rng: &Rand, side: u32) {
	let mut opened = 0u32;

	for y in 1..side - 1 {
		for x in 1..side - 1 {
			if maze.get(x, y) != CELL_WALL {
				continue;
			}

			let (x, y) = (x as i32, y as i32);
			let horizontal = maze.is_open(x - 1, y) && maze.is_open(x + 1, y);
			let vertical = maze.is_open(x, y - 1) && maze.is_open(x, y + 1);

			if (horizontal ^ vertical) && rng.chance(BRAID_RATE) {
				maze.set(x as u32, y as u32, CELL_OPEN);
				opened += 1;
			}
		}
	}

	debug!("braiding opened {opened} walls");
}
