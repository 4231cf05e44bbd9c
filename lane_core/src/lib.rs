//! # lane_core - StrikePath Alignment Engine
//!
//! `lane_core` works out where a bowler should stand on the approach from
//! their target board, their breakpoint board and a few personal constants
//! (handedness, drift, lay-down distance). It also keeps the roster of
//! bowler profiles and moves profiles between devices as share links.
//!
//! ## Design Philosophy
//!
//! - **Stateless core**: the alignment calculation is a pure function
//! - **JSON-First**: all stored and shared types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use lane_core::bowler::{BowlerProfile, DriftDirection, Handedness};
//! use lane_core::roster::Roster;
//! use lane_core::session::CalculatorSession;
//!
//! let mut roster = Roster::new();
//! let id = roster.add_bowler(BowlerProfile {
//!     name: "Chris".to_string(),
//!     handedness: Handedness::Right,
//!     drift: 3,
//!     drift_direction: DriftDirection::Right,
//!     lay_down_distance: 6,
//! }).unwrap();
//!
//! let mut session = CalculatorSession::new();
//! session.select(&mut roster, &id).unwrap();
//!
//! let result = session.result(&roster).unwrap();
//! assert_eq!(result.stance_foot_board, 35);
//! ```
//!
//! ## Modules
//!
//! - [`bowler`] - Bowler profiles, handedness, drift direction
//! - [`calculations`] - Stance alignment calculation
//! - [`roster`] - Profile store container and settings
//! - [`session`] - Live calculator state with input write-through
//! - [`share`] - Share token / link codec
//! - [`errors`] - Structured error types
//! - [`file_io`] - Roster files with atomic saves and locking

pub mod bowler;
pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod roster;
pub mod session;
pub mod share;

// Re-export commonly used types at crate root for convenience
pub use bowler::{Bowler, BowlerProfile, DriftDirection, Handedness};
pub use calculations::{calculate, AlignmentInput, CalculationResult};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_or_create_roster, load_roster, save_roster, FileLock};
pub use roster::{Roster, RosterSettings};
pub use session::CalculatorSession;
