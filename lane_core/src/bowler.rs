//! # Bowler Profiles
//!
//! A [`Bowler`] is an identity plus the handful of physical constants the
//! alignment calculation needs. The editable part of a bowler lives in
//! [`BowlerProfile`], which is what add/edit forms and CLI flags produce.
//!
//! Field names serialize in camelCase and enum values as `"Right"`, `"Left"`
//! and `"None"`, the same shape roster files and share tokens use.
//!
//! ## Example
//!
//! ```rust
//! use lane_core::bowler::{Bowler, BowlerProfile, DriftDirection, Handedness};
//!
//! let profile = BowlerProfile {
//!     name: "Chris".to_string(),
//!     handedness: Handedness::Right,
//!     drift: 3,
//!     drift_direction: DriftDirection::Left,
//!     lay_down_distance: 6,
//! };
//!
//! let bowler = Bowler::new(profile).unwrap();
//! assert_eq!(bowler.target_or_default(), 20);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};

/// Lowest board the calculator input pad accepts
pub const MIN_BOARD: i32 = 1;

/// Highest board the calculator input pad accepts
pub const MAX_BOARD: i32 = 39;

/// Target board used when a bowler has no saved target
pub const DEFAULT_TARGET_BOARD: i32 = 20;

/// Breakpoint board used when a bowler has no saved breakpoint
pub const DEFAULT_BREAKPOINT_BOARD: i32 = 10;

/// Lay-down distance pre-filled on the new bowler form
pub const DEFAULT_LAY_DOWN_DISTANCE: i32 = 6;

/// Largest drift a profile may carry, one lane width
pub const MAX_DRIFT: u32 = 39;

/// Largest lay-down distance either side of the slide foot, one lane width
pub const MAX_LAY_DOWN_DISTANCE: i32 = 39;

/// Clamp a board number to the range the input pad allows.
pub fn clamp_board(board: i32) -> i32 {
    board.clamp(MIN_BOARD, MAX_BOARD)
}

/// Which hand the bowler throws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    /// All variants for selection lists
    pub const ALL: [Handedness; 2] = [Handedness::Right, Handedness::Left];

    /// Parse from common string representations ("right", "R", "rh", ...)
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "right" | "r" | "rh" | "righthanded" => Ok(Handedness::Right),
            "left" | "l" | "lh" | "lefthanded" => Ok(Handedness::Left),
            _ => Err(CalcError::invalid_input(
                "handedness",
                s,
                "Expected 'right' or 'left'",
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Handedness::Right => "Right-Handed",
            Handedness::Left => "Left-Handed",
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lane-relative direction the slide foot drifts in.
///
/// `None` means the bowler walks straight; any stored drift magnitude is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DriftDirection {
    Left,
    Right,
    #[default]
    None,
}

impl DriftDirection {
    /// All variants for selection lists
    pub const ALL: [DriftDirection; 3] = [
        DriftDirection::None,
        DriftDirection::Left,
        DriftDirection::Right,
    ];

    /// Parse from common string representations ("left", "stable", ...)
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(DriftDirection::Left),
            "right" | "r" => Ok(DriftDirection::Right),
            "none" | "stable" | "n" | "0" => Ok(DriftDirection::None),
            _ => Err(CalcError::invalid_input(
                "drift_direction",
                s,
                "Expected 'left', 'right' or 'none'",
            )),
        }
    }

    /// Sign applied to the drift when moving from slide foot to stance foot.
    ///
    /// Drift direction is lane-relative, but the stance foot is the
    /// non-dominant foot, so the effect mirrors with handedness.
    pub fn stance_sign(&self, handedness: Handedness) -> i32 {
        match (handedness, self) {
            (_, DriftDirection::None) => 0,
            (Handedness::Right, DriftDirection::Right) | (Handedness::Left, DriftDirection::Left) => 1,
            (Handedness::Right, DriftDirection::Left) | (Handedness::Left, DriftDirection::Right) => -1,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DriftDirection::Left => "Left",
            DriftDirection::Right => "Right",
            DriftDirection::None => "Stable",
        }
    }
}

impl std::fmt::Display for DriftDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The editable fields of a bowler.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Chris",
///   "handedness": "Right",
///   "drift": 3,
///   "driftDirection": "Left",
///   "layDownDistance": 6
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlerProfile {
    /// Display name (must not be blank)
    pub name: String,

    /// Throwing hand
    pub handedness: Handedness,

    /// Boards the slide foot drifts between stance and release
    pub drift: u32,

    /// Lane-relative drift direction
    pub drift_direction: DriftDirection,

    /// Boards between the ball at release and the slide foot
    pub lay_down_distance: i32,
}

impl BowlerProfile {
    /// Validate the profile before it is stored.
    pub fn validate(&self) -> CalcResult<()> {
        if self.name.trim().is_empty() {
            return Err(CalcError::invalid_input(
                "name",
                self.name.clone(),
                "Name must not be empty",
            ));
        }
        if self.drift > MAX_DRIFT {
            return Err(CalcError::invalid_input(
                "drift",
                self.drift.to_string(),
                format!("Drift must be at most {} boards", MAX_DRIFT),
            ));
        }
        if self.lay_down_distance.abs() > MAX_LAY_DOWN_DISTANCE {
            return Err(CalcError::invalid_input(
                "lay_down_distance",
                self.lay_down_distance.to_string(),
                format!("Lay-down distance must be within {} boards", MAX_LAY_DOWN_DISTANCE),
            ));
        }
        Ok(())
    }
}

impl Default for BowlerProfile {
    fn default() -> Self {
        BowlerProfile {
            name: String::new(),
            handedness: Handedness::Right,
            drift: 0,
            drift_direction: DriftDirection::None,
            lay_down_distance: DEFAULT_LAY_DOWN_DISTANCE,
        }
    }
}

/// A stored bowler: identity, physical constants and last-used inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bowler {
    /// Assigned at creation, never changed afterwards
    pub id: Uuid,

    #[serde(flatten)]
    pub profile: BowlerProfile,

    /// Last target board used with this bowler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_target: Option<i32>,

    /// Last breakpoint board used with this bowler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_breakpoint: Option<i32>,
}

impl Bowler {
    /// Create a bowler with a freshly generated id.
    ///
    /// Last inputs start out unset; the roster seeds them when the bowler
    /// is added.
    pub fn new(profile: BowlerProfile) -> CalcResult<Self> {
        profile.validate()?;
        Ok(Bowler {
            id: Uuid::new_v4(),
            profile,
            last_target: None,
            last_breakpoint: None,
        })
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Saved target board, or the default of 20
    pub fn target_or_default(&self) -> i32 {
        self.last_target.unwrap_or(DEFAULT_TARGET_BOARD)
    }

    /// Saved breakpoint board, or the default of 10
    pub fn breakpoint_or_default(&self) -> i32 {
        self.last_breakpoint.unwrap_or(DEFAULT_BREAKPOINT_BOARD)
    }

    /// Signed offset from slide foot to stance foot. Drift is capped at
    /// [`MAX_DRIFT`] for profiles built without `validate`.
    pub fn stance_offset(&self) -> i32 {
        let drift = self.profile.drift.min(MAX_DRIFT) as i32;
        self.profile.drift_direction.stance_sign(self.profile.handedness) * drift
    }

    /// One-line summary used by roster listings
    pub fn summary(&self) -> String {
        format!(
            "{} | Drift: {} {} | Lay down: {}",
            self.profile.handedness,
            self.profile.drift,
            self.profile.drift_direction,
            self.profile.lay_down_distance
        )
    }
}
