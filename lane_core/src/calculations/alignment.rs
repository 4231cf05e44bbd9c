//! # Stance Alignment Calculation
//!
//! Turns a target board, a breakpoint board and a bowler's constants into
//! the board the bowler's non-dominant foot should start on.
//!
//! ## Method
//!
//! 1. `x = target - breakpoint`
//! 2. `y = ceil(x / 2)` (true ceiling, so `x = -3` gives `y = -1`)
//! 3. ball lay-down board = `y + target + 1`
//! 4. slide foot board = lay-down board + lay-down distance
//! 5. stance foot board = slide foot board shifted by drift, where the sign
//!    depends on handedness and drift direction
//!
//! The arithmetic is total over integers: it saturates at the `i32` bounds
//! instead of overflowing. Boards outside 1-39 are returned as-is; range
//! limits belong to the input pad.
//!
//! ## Example
//!
//! ```rust
//! use lane_core::bowler::{Bowler, BowlerProfile, DriftDirection, Handedness};
//! use lane_core::calculations::alignment::{calculate, AlignmentInput};
//!
//! let bowler = Bowler::new(BowlerProfile {
//!     name: "Chris".to_string(),
//!     handedness: Handedness::Right,
//!     drift: 3,
//!     drift_direction: DriftDirection::Right,
//!     lay_down_distance: 6,
//! }).unwrap();
//!
//! let input = AlignmentInput { target_board: 20, breakpoint_board: 10 };
//! let result = calculate(&input, Some(&bowler)).unwrap();
//!
//! assert_eq!(result.ball_lay_down_board, 26);
//! assert_eq!(result.slide_foot_board, 32);
//! assert_eq!(result.stance_foot_board, 35);
//! ```

use serde::{Deserialize, Serialize};

use crate::bowler::{Bowler, DEFAULT_BREAKPOINT_BOARD, DEFAULT_TARGET_BOARD};

/// The two live inputs of the calculator.
///
/// ## JSON Example
///
/// ```json
/// { "targetBoard": 20, "breakpointBoard": 10 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentInput {
    /// Board aimed over at the arrows
    pub target_board: i32,

    /// Board where the ball starts to hook
    pub breakpoint_board: i32,
}

impl AlignmentInput {
    /// The bowler's saved inputs, falling back to 20 / 10.
    pub fn from_bowler(bowler: &Bowler) -> Self {
        AlignmentInput {
            target_board: bowler.target_or_default(),
            breakpoint_board: bowler.breakpoint_or_default(),
        }
    }
}

impl Default for AlignmentInput {
    fn default() -> Self {
        AlignmentInput {
            target_board: DEFAULT_TARGET_BOARD,
            breakpoint_board: DEFAULT_BREAKPOINT_BOARD,
        }
    }
}

/// Derived board positions. Never persisted.
///
/// ## JSON Example
///
/// ```json
/// {
///   "x": 10,
///   "y": 5,
///   "ballLayDownBoard": 26,
///   "slideFootBoard": 32,
///   "stanceFootBoard": 35
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Target minus breakpoint
    pub x: i32,

    /// Ceiling of x / 2
    pub y: i32,

    /// Board where the ball is laid down
    pub ball_lay_down_board: i32,

    /// Board of the slide foot at release
    pub slide_foot_board: i32,

    /// Starting board of the non-dominant foot
    pub stance_foot_board: i32,
}

/// Ceiling of `x / 2`, rounding toward positive infinity for negative `x` too.
pub fn ceil_half(x: i32) -> i32 {
    x.div_euclid(2) + x.rem_euclid(2)
}

/// Calculate the stance alignment.
///
/// Returns `None` when no bowler is selected; there is nothing to show in
/// that case and it is not an error.
pub fn calculate(input: &AlignmentInput, bowler: Option<&Bowler>) -> Option<CalculationResult> {
    let bowler = bowler?;

    let x = input.target_board.saturating_sub(input.breakpoint_board);
    let y = ceil_half(x);
    let ball_lay_down_board = y.saturating_add(input.target_board).saturating_add(1);
    let slide_foot_board = ball_lay_down_board.saturating_add(bowler.profile.lay_down_distance);
    let stance_foot_board = slide_foot_board.saturating_add(bowler.stance_offset());

    Some(CalculationResult {
        x,
        y,
        ball_lay_down_board,
        slide_foot_board,
        stance_foot_board,
    })
}
