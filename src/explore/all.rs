//! The lock-step meta-strategy: one child per base strategy, all advanced
//! by one step per tick.

use std::sync::Arc;

use crate::error::Error;

use super::{Core, Explorer, State};

/// Hand the parent's route and cancellation flag to every child and put
/// them back at the start state
pub(super) fn seed(core: &Core, children: &mut [Explorer]) {
	for child in children.iter_mut() {
		let (start, end) = (core.start, core.end);
		child.set_route(start, end);

		if let Some(cancel) = &core.cancel {
			child.set_cancel(Arc::clone(cancel));
		}

		child.reset();
	}
}

/// Advance every child that has not ended yet; once all have ended,
/// consolidate the best result
pub(super) fn step(core: &mut Core, children: &mut [Explorer]) {
	for child in children.iter_mut() {
		if child.state() != State::End {
			child.update();
		}
	}

	if children.iter().any(|child| child.state() != State::End) {
		return;
	}

	// The winner is the found child with the strictly shortest path;
	// ties go to the earlier child in the fixed strategy order
	let best = children
		.iter()
		.filter(|child| child.found())
		.min_by_key(|child| child.path().len());

	match best {
		Some(child) => {
			let route = child.path().to_vec();
			core.complete(route);
		}
		None => {
			let error = children
				.iter()
				.find_map(|child| child.error().cloned())
				.unwrap_or(Error::NoPath);
			core.fail(error);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::tests::{cells, reference_maze, run};
	use super::super::{Explorer, State, Strategy};

	#[test]
	fn advances_all_children_and_picks_the_shortest() {
		let mut explorer = Explorer::new(reference_maze(), Strategy::All);
		explorer.set_route((1, 1), (1, 3));
		run(&mut explorer);

		assert_eq!(explorer.children().len(), 6);
		assert!(explorer
			.children()
			.iter()
			.all(|child| child.state() == State::End));

		// The wall-breaking child wins with its three-cell shortcut
		assert!(explorer.found());
		assert_eq!(cells(explorer.path()), vec![(1, 1), (1, 2), (1, 3)]);
	}

	#[test]
	fn children_keep_the_fixed_order() {
		let explorer = Explorer::new(reference_maze(), Strategy::All);
		let order: Vec<_> = explorer
			.children()
			.iter()
			.map(super::super::Explorer::strategy)
			.collect();
		assert_eq!(order, Strategy::COMPARED);
	}

	#[test]
	fn reports_no_path_when_every_child_fails() {
		// Start sealed in; even wall breaking cannot reach the far cell
		// within its three-wall budget
		let maze = crate::maze::Maze::from_grid(&[
			&[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1][..],
			&[1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 1][..],
			&[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1][..],
		])
		.unwrap();

		let mut explorer = Explorer::new(maze, Strategy::All);
		explorer.set_route((1, 1), (9, 1));
		run(&mut explorer);

		assert!(!explorer.found());
		assert!(explorer.error().is_some());
	}
}
