//! An interactive maze pathfinding laboratory.
//!
//! The crate generates braided mazes and searches them under six
//! strategies (depth-first, breadth-first, breadth-first with bounded
//! wall-breaking, Dijkstra, A*, and all-pairs Floyd-Warshall over a
//! corridor-compressed graph) behind a uniform tick-driven interface, so
//! a UI can animate the exploration and compare the strategies
//! side-by-side. The [`search`] driver runs one strategy (or all of them
//! in lock-step), paints exploration and path artifacts onto a render
//! copy of the maze using a stable color-code scheme, and fills a
//! per-strategy statistics record.
//!
//! Windowing, meshes, input and thread pools live outside this crate;
//! they interact with it only through maze values, the animation
//! callback, a shared cancellation flag and the statistics output.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss
)]

pub mod error;
pub mod explore;
pub mod generate;
pub mod maze;
pub mod search;
pub mod util;

pub use error::Error;
pub use explore::{Explorer, PointInfo, State, Strategy, K_MAX};
pub use generate::{build, build_with, BuildPacing};
pub use maze::{Maze, MazeSize, CELL_BROKEN_WALL, CELL_OPEN, CELL_WALL};
pub use search::{search, SearchOptions, SearchStats, StrategyStats};
