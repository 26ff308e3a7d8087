//! Manufacturer's Pallet Loading Problem solver.
//!
//! Given a rectangular container and a single rectangular item size, finds a
//! guillotine-cut arrangement maximizing the number of non-overlapping,
//! axis-aligned item copies. The search is a recursive five-block
//! decomposition with normal-point cut candidates, branch-and-bound pruning,
//! and symmetry reduction.
//!
//! ```
//! use pallet_optimizer::packer::expand;
//! use pallet_optimizer::solver::Solver;
//! use pallet_optimizer::types::Rect;
//!
//! let solver = Solver::new(Rect::new(5, 5), Rect::new(3, 2), 2).unwrap();
//! let solution = solver.solve();
//! assert_eq!(solution.count, 4);
//!
//! let placements = expand(&solution.blocks, solution.item).unwrap();
//! assert_eq!(placements.len(), 4);
//! ```

pub mod coords;
pub mod error;
pub mod packer;
pub mod solver;
pub mod types;
