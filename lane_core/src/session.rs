//! # Calculator Session
//!
//! Live calculator state for one front end: which bowler is selected and
//! the current target and breakpoint boards.
//!
//! - Selecting a bowler loads that bowler's last-used inputs (20 / 10 when
//!   it has none) and records it as the roster's last selection.
//! - Input changes are clamped to boards 1-39 and written through to the
//!   selected bowler's `lastTarget` / `lastBreakpoint` in the roster.
//! - [`CalculatorSession::result`] recomputes on every call, so it always
//!   reflects the latest inputs and the latest bowler record.
//!
//! ## Example
//!
//! ```rust
//! use lane_core::bowler::BowlerProfile;
//! use lane_core::roster::Roster;
//! use lane_core::session::CalculatorSession;
//!
//! let mut roster = Roster::new();
//! let id = roster.add_bowler(BowlerProfile { name: "Jess".into(), ..Default::default() }).unwrap();
//!
//! let mut session = CalculatorSession::restore(&roster);
//! assert!(session.result(&roster).is_none());
//!
//! session.select(&mut roster, &id).unwrap();
//! session.set_target(&mut roster, 25);
//! assert_eq!(roster.get_bowler(&id).unwrap().last_target, Some(25));
//! assert!(session.result(&roster).is_some());
//! ```

use tracing::{debug, warn};
use uuid::Uuid;

use crate::bowler::{clamp_board, Bowler};
use crate::calculations::alignment::{self, AlignmentInput, CalculationResult};
use crate::errors::{CalcError, CalcResult};
use crate::roster::Roster;

/// Selected bowler plus the two live inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorSession {
    selected: Option<Uuid>,
    input: AlignmentInput,
}

impl CalculatorSession {
    /// Empty session: nothing selected, default inputs.
    pub fn new() -> Self {
        CalculatorSession {
            selected: None,
            input: AlignmentInput::default(),
        }
    }

    /// Start a session from the roster's last selection, if any.
    pub fn restore(roster: &Roster) -> Self {
        let mut session = CalculatorSession::new();
        if let Some(bowler) = roster.last_selected().and_then(|id| roster.get_bowler(&id)) {
            session.load_bowler(bowler);
        }
        session
    }

    fn load_bowler(&mut self, bowler: &Bowler) {
        self.selected = Some(bowler.id);
        self.input = AlignmentInput::from_bowler(bowler);
    }

    /// Select a bowler and load their last-used inputs.
    pub fn select(&mut self, roster: &mut Roster, id: &Uuid) -> CalcResult<()> {
        let bowler = roster
            .get_bowler(id)
            .ok_or_else(|| CalcError::bowler_not_found(id.to_string()))?;
        self.load_bowler(bowler);
        roster.select(id)?;
        debug!(%id, target = self.input.target_board, breakpoint = self.input.breakpoint_board, "bowler selected");
        Ok(())
    }

    /// Deselect the current bowler. The inputs keep their values.
    pub fn clear_selection(&mut self, roster: &mut Roster) {
        self.selected = None;
        roster.clear_selection();
    }

    /// Id of the selected bowler, if it is still in the roster.
    pub fn selected_id(&self, roster: &Roster) -> Option<Uuid> {
        self.selected.filter(|id| roster.contains(id))
    }

    /// The selected bowler, if it is still in the roster.
    pub fn selected_bowler<'a>(&self, roster: &'a Roster) -> Option<&'a Bowler> {
        self.selected.and_then(|id| roster.get_bowler(&id))
    }

    /// Current inputs
    pub fn input(&self) -> AlignmentInput {
        self.input
    }

    /// Current target board
    pub fn target_board(&self) -> i32 {
        self.input.target_board
    }

    /// Current breakpoint board
    pub fn breakpoint_board(&self) -> i32 {
        self.input.breakpoint_board
    }

    /// Set the target board (clamped to 1-39) and save it on the selected bowler.
    ///
    /// Returns the value actually applied.
    pub fn set_target(&mut self, roster: &mut Roster, board: i32) -> i32 {
        self.input.target_board = clamp_board(board);
        self.write_through(roster);
        self.input.target_board
    }

    /// Set the breakpoint board (clamped to 1-39) and save it on the selected bowler.
    ///
    /// Returns the value actually applied.
    pub fn set_breakpoint(&mut self, roster: &mut Roster, board: i32) -> i32 {
        self.input.breakpoint_board = clamp_board(board);
        self.write_through(roster);
        self.input.breakpoint_board
    }

    /// Nudge the target board by `delta` boards, as the +/- buttons do.
    pub fn step_target(&mut self, roster: &mut Roster, delta: i32) -> i32 {
        let board = self.input.target_board.saturating_add(delta);
        self.set_target(roster, board)
    }

    /// Nudge the breakpoint board by `delta` boards, as the +/- buttons do.
    pub fn step_breakpoint(&mut self, roster: &mut Roster, delta: i32) -> i32 {
        let board = self.input.breakpoint_board.saturating_add(delta);
        self.set_breakpoint(roster, board)
    }

    fn write_through(&mut self, roster: &mut Roster) {
        let Some(id) = self.selected else {
            return;
        };
        if let Err(e) = roster.set_last_inputs(&id, self.input.target_board, self.input.breakpoint_board) {
            // The bowler was removed behind our back
            warn!(%id, error = %e, "selected bowler is gone, clearing selection");
            self.selected = None;
        }
    }

    /// Alignment for the current inputs and selected bowler.
    ///
    /// `None` when no bowler is selected or the selected bowler was removed.
    pub fn result(&self, roster: &Roster) -> Option<CalculationResult> {
        alignment::calculate(&self.input, self.selected_bowler(roster))
    }
}

impl Default for CalculatorSession {
    fn default() -> Self {
        CalculatorSession::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bowler::{BowlerProfile, DriftDirection, Handedness};

    fn roster_with(names: &[&str]) -> (Roster, Vec<Uuid>) {
        let mut roster = Roster::new();
        let ids = names
            .iter()
            .map(|name| {
                roster
                    .add_bowler(BowlerProfile {
                        name: name.to_string(),
                        handedness: Handedness::Right,
                        drift: 3,
                        drift_direction: DriftDirection::Right,
                        lay_down_distance: 6,
                    })
                    .unwrap()
            })
            .collect();
        (roster, ids)
    }

    #[test]
    fn test_new_session_has_no_result() {
        let (roster, _) = roster_with(&["Ann"]);
        let session = CalculatorSession::new();
        assert!(session.result(&roster).is_none());
        assert_eq!(session.target_board(), 20);
        assert_eq!(session.breakpoint_board(), 10);
    }

    #[test]
    fn test_select_loads_last_inputs() {
        let (mut roster, ids) = roster_with(&["Ann", "Bo"]);
        roster.set_last_inputs(&ids[1], 30, 12).unwrap();

        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[1]).unwrap();
        assert_eq!(session.input(), AlignmentInput { target_board: 30, breakpoint_board: 12 });
        assert_eq!(roster.last_selected(), Some(ids[1]));

        session.select(&mut roster, &ids[0]).unwrap();
        assert_eq!(session.input(), AlignmentInput::default());
    }

    #[test]
    fn test_select_unknown_bowler() {
        let (mut roster, _) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        assert!(session.select(&mut roster, &Uuid::new_v4()).is_err());
        assert!(session.selected_id(&roster).is_none());
    }

    #[test]
    fn test_inputs_write_through() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[0]).unwrap();

        session.set_target(&mut roster, 24);
        session.set_breakpoint(&mut roster, 8);

        let bowler = roster.get_bowler(&ids[0]).unwrap();
        assert_eq!(bowler.last_target, Some(24));
        assert_eq!(bowler.last_breakpoint, Some(8));
    }

    #[test]
    fn test_inputs_without_selection_touch_nothing() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        assert_eq!(session.set_target(&mut roster, 33), 33);
        assert_eq!(roster.get_bowler(&ids[0]).unwrap().last_target, Some(20));
    }

    #[test]
    fn test_inputs_are_clamped() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[0]).unwrap();

        assert_eq!(session.set_target(&mut roster, 0), 1);
        assert_eq!(session.step_target(&mut roster, -1), 1);
        assert_eq!(session.set_breakpoint(&mut roster, 45), 39);
        assert_eq!(session.step_breakpoint(&mut roster, 1), 39);
        assert_eq!(session.step_breakpoint(&mut roster, -2), 37);
        assert_eq!(roster.get_bowler(&ids[0]).unwrap().last_breakpoint, Some(37));
    }

    #[test]
    fn test_result_tracks_latest_inputs() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[0]).unwrap();

        assert_eq!(session.result(&roster).unwrap().stance_foot_board, 35);

        session.set_target(&mut roster, 10);
        let result = session.result(&roster).unwrap();
        assert_eq!(result.x, 0);
        assert_eq!(result.ball_lay_down_board, 11);
    }

    #[test]
    fn test_result_tracks_bowler_edits() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[0]).unwrap();

        let mut profile = roster.get_bowler(&ids[0]).unwrap().profile.clone();
        profile.drift_direction = DriftDirection::Left;
        roster.update_bowler(&ids[0], profile).unwrap();

        assert_eq!(session.result(&roster).unwrap().stance_foot_board, 29);
    }

    #[test]
    fn test_removed_bowler_gives_no_result() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[0]).unwrap();

        roster.remove_bowler(&ids[0]);
        assert!(session.result(&roster).is_none());

        session.set_target(&mut roster, 15);
        assert!(session.selected_id(&roster).is_none());
        assert!(session.result(&roster).is_none());
    }

    #[test]
    fn test_restore_uses_last_selection() {
        let (mut roster, ids) = roster_with(&["Ann", "Bo"]);
        roster.set_last_inputs(&ids[1], 28, 14).unwrap();
        roster.select(&ids[1]).unwrap();

        let session = CalculatorSession::restore(&roster);
        assert_eq!(session.selected_id(&roster), Some(ids[1]));
        assert_eq!(session.target_board(), 28);
        assert_eq!(session.breakpoint_board(), 14);
    }

    #[test]
    fn test_clear_selection() {
        let (mut roster, ids) = roster_with(&["Ann"]);
        let mut session = CalculatorSession::new();
        session.select(&mut roster, &ids[0]).unwrap();

        session.clear_selection(&mut roster);
        assert!(session.result(&roster).is_none());
        assert!(roster.last_selected().is_none());
    }
}
