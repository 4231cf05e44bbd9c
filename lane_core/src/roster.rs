//! # Bowler Roster
//!
//! The `Roster` is the root container for stored bowler profiles.
//! Rosters serialize to `.strk` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Roster
//! ├── meta: RosterMetadata (schema version, timestamps)
//! ├── settings: RosterSettings (default calculator inputs)
//! ├── bowlers: Vec<Bowler> (display order = insertion order)
//! └── lastSelected: Option<Uuid>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lane_core::bowler::BowlerProfile;
//! use lane_core::roster::Roster;
//!
//! let mut roster = Roster::new();
//! let id = roster.add_bowler(BowlerProfile {
//!     name: "Jess".to_string(),
//!     ..BowlerProfile::default()
//! }).unwrap();
//!
//! assert_eq!(roster.get_bowler(&id).unwrap().last_target, Some(20));
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bowler::{Bowler, BowlerProfile, DEFAULT_BREAKPOINT_BOARD, DEFAULT_TARGET_BOARD};
use crate::errors::{CalcError, CalcResult};

/// Current schema version for .strk files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root roster container.
///
/// Bowlers are kept in a Vec so listings keep the order bowlers were added
/// in. Ids are unique; every insert path checks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    /// Roster metadata (schema version, timestamps)
    pub meta: RosterMetadata,

    /// Roster-wide settings
    #[serde(default)]
    pub settings: RosterSettings,

    #[serde(default)]
    bowlers: Vec<Bowler>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_selected: Option<Uuid>,
}

impl Roster {
    /// Create a new empty roster.
    pub fn new() -> Self {
        let now = Utc::now();
        Roster {
            meta: RosterMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            settings: RosterSettings::default(),
            bowlers: Vec::new(),
            last_selected: None,
        }
    }

    /// Add a new bowler built from a profile.
    ///
    /// The bowler gets a fresh id and its last inputs are seeded with the
    /// roster's default target and breakpoint. Returns the new id.
    pub fn add_bowler(&mut self, profile: BowlerProfile) -> CalcResult<Uuid> {
        let mut bowler = Bowler::new(profile)?;
        bowler.last_target = Some(self.settings.default_target);
        bowler.last_breakpoint = Some(self.settings.default_breakpoint);
        let id = bowler.id;
        self.insert(bowler)?;
        debug!(%id, "added bowler");
        Ok(id)
    }

    /// Import a bowler received through a share link.
    ///
    /// The incoming id is discarded and a new one generated, so importing
    /// the same profile twice (or on the device it came from) never
    /// collides with an existing bowler.
    pub fn import_bowler(&mut self, mut bowler: Bowler) -> CalcResult<Uuid> {
        bowler.profile.validate()?;
        bowler.id = Uuid::new_v4();
        let id = bowler.id;
        self.insert(bowler)?;
        debug!(%id, "imported bowler");
        Ok(id)
    }

    fn insert(&mut self, bowler: Bowler) -> CalcResult<()> {
        if self.contains(&bowler.id) {
            return Err(CalcError::invalid_input(
                "id",
                bowler.id.to_string(),
                "A bowler with this id already exists",
            ));
        }
        self.bowlers.push(bowler);
        self.touch();
        Ok(())
    }

    /// Replace a bowler's profile fields.
    ///
    /// The id and the last-used inputs are kept.
    pub fn update_bowler(&mut self, id: &Uuid, profile: BowlerProfile) -> CalcResult<()> {
        profile.validate()?;
        let bowler = self
            .bowlers
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| CalcError::bowler_not_found(id.to_string()))?;
        bowler.profile = profile;
        self.touch();
        debug!(%id, "updated bowler");
        Ok(())
    }

    /// Record the calculator inputs last used with a bowler.
    pub fn set_last_inputs(&mut self, id: &Uuid, target: i32, breakpoint: i32) -> CalcResult<()> {
        let bowler = self
            .bowlers
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| CalcError::bowler_not_found(id.to_string()))?;
        bowler.last_target = Some(target);
        bowler.last_breakpoint = Some(breakpoint);
        self.touch();
        Ok(())
    }

    /// Remove a bowler by id.
    ///
    /// Returns the removed bowler if it existed. Clears the last selection
    /// when it pointed at the removed bowler.
    pub fn remove_bowler(&mut self, id: &Uuid) -> Option<Bowler> {
        let index = self.bowlers.iter().position(|b| &b.id == id)?;
        let removed = self.bowlers.remove(index);
        if self.last_selected.as_ref() == Some(id) {
            self.last_selected = None;
        }
        self.touch();
        debug!(%id, "removed bowler");
        Some(removed)
    }

    /// Get a bowler by id.
    pub fn get_bowler(&self, id: &Uuid) -> Option<&Bowler> {
        self.bowlers.iter().find(|b| &b.id == id)
    }

    /// Check whether a bowler with this id exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.bowlers.iter().any(|b| &b.id == id)
    }

    /// All bowlers in display order.
    pub fn bowlers(&self) -> &[Bowler] {
        &self.bowlers
    }

    /// Number of stored bowlers
    pub fn bowler_count(&self) -> usize {
        self.bowlers.len()
    }

    /// Look a bowler up by full id, case-insensitive name, or unique id prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lane_core::bowler::BowlerProfile;
    /// use lane_core::roster::Roster;
    ///
    /// let mut roster = Roster::new();
    /// let id = roster.add_bowler(BowlerProfile { name: "Jess".into(), ..Default::default() }).unwrap();
    ///
    /// assert_eq!(roster.find_bowler("jess").unwrap().id, id);
    /// assert_eq!(roster.find_bowler(&id.to_string()[..8]).unwrap().id, id);
    /// ```
    pub fn find_bowler(&self, query: &str) -> CalcResult<&Bowler> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self
                .get_bowler(&id)
                .ok_or_else(|| CalcError::bowler_not_found(query));
        }

        let by_name: Vec<&Bowler> = self
            .bowlers
            .iter()
            .filter(|b| b.name().eq_ignore_ascii_case(query))
            .collect();
        let matches = if by_name.is_empty() && !query.is_empty() {
            let prefix = query.to_lowercase();
            self.bowlers
                .iter()
                .filter(|b| b.id.to_string().starts_with(&prefix))
                .collect()
        } else {
            by_name
        };

        match matches.as_slice() {
            [] => Err(CalcError::bowler_not_found(query)),
            [bowler] => Ok(*bowler),
            _ => Err(CalcError::invalid_input(
                "bowler",
                query,
                format!("Matches {} bowlers - use the id instead", matches.len()),
            )),
        }
    }

    /// Id of the bowler selected most recently, if it still exists.
    pub fn last_selected(&self) -> Option<Uuid> {
        self.last_selected.filter(|id| self.contains(id))
    }

    /// Remember a bowler as the current selection.
    pub fn select(&mut self, id: &Uuid) -> CalcResult<()> {
        if !self.contains(id) {
            return Err(CalcError::bowler_not_found(id.to_string()));
        }
        if self.last_selected.as_ref() != Some(id) {
            self.last_selected = Some(*id);
            self.touch();
        }
        Ok(())
    }

    /// Forget the current selection.
    pub fn clear_selection(&mut self) {
        if self.last_selected.take().is_some() {
            self.touch();
        }
    }

    /// Check structural invariants after loading from disk.
    ///
    /// Duplicate ids are an error. A selection pointing at a bowler that no
    /// longer exists is dropped.
    pub fn validate(&mut self) -> CalcResult<()> {
        let mut seen = HashSet::new();
        for bowler in &self.bowlers {
            if !seen.insert(bowler.id) {
                return Err(CalcError::invalid_input(
                    "bowlers",
                    bowler.id.to_string(),
                    "Duplicate bowler id",
                ));
            }
            bowler.profile.validate()?;
        }
        if let Some(id) = self.last_selected {
            if !seen.contains(&id) {
                warn!(%id, "dropping selection of unknown bowler");
                self.last_selected = None;
            }
        }
        Ok(())
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for Roster {
    fn default() -> Self {
        Roster::new()
    }
}

/// Roster metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// When the roster was created
    pub created: DateTime<Utc>,

    /// When the roster was last modified
    pub modified: DateTime<Utc>,
}

/// Roster-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RosterSettings {
    /// Target board given to newly added bowlers
    pub default_target: i32,

    /// Breakpoint board given to newly added bowlers
    pub default_breakpoint: i32,
}

impl Default for RosterSettings {
    fn default() -> Self {
        RosterSettings {
            default_target: DEFAULT_TARGET_BOARD,
            default_breakpoint: DEFAULT_BREAKPOINT_BOARD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bowler::{DriftDirection, Handedness};

    fn profile(name: &str) -> BowlerProfile {
        BowlerProfile {
            name: name.to_string(),
            handedness: Handedness::Right,
            drift: 2,
            drift_direction: DriftDirection::Left,
            lay_down_distance: 6,
        }
    }

    #[test]
    fn test_roster_creation() {
        let roster = Roster::new();
        assert_eq!(roster.meta.version, SCHEMA_VERSION);
        assert_eq!(roster.bowler_count(), 0);
        assert!(roster.last_selected().is_none());
    }

    #[test]
    fn test_add_seeds_last_inputs() {
        let mut roster = Roster::new();
        let id = roster.add_bowler(profile("Ann")).unwrap();
        let bowler = roster.get_bowler(&id).unwrap();
        assert_eq!(bowler.last_target, Some(20));
        assert_eq!(bowler.last_breakpoint, Some(10));
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut roster = Roster::new();
        assert!(roster.add_bowler(profile("")).is_err());
        assert_eq!(roster.bowler_count(), 0);
    }

    #[test]
    fn test_bowlers_keep_insertion_order() {
        let mut roster = Roster::new();
        for name in ["Cy", "Ann", "Bo"] {
            roster.add_bowler(profile(name)).unwrap();
        }
        let names: Vec<&str> = roster.bowlers().iter().map(|b| b.name()).collect();
        assert_eq!(names, ["Cy", "Ann", "Bo"]);
    }

    #[test]
    fn test_update_keeps_id_and_last_inputs() {
        let mut roster = Roster::new();
        let id = roster.add_bowler(profile("Ann")).unwrap();
        roster.set_last_inputs(&id, 15, 5).unwrap();

        let mut edited = profile("Ann B");
        edited.handedness = Handedness::Left;
        roster.update_bowler(&id, edited.clone()).unwrap();

        let bowler = roster.get_bowler(&id).unwrap();
        assert_eq!(bowler.id, id);
        assert_eq!(bowler.profile, edited);
        assert_eq!(bowler.last_target, Some(15));
        assert_eq!(bowler.last_breakpoint, Some(5));
    }

    #[test]
    fn test_update_unknown_bowler() {
        let mut roster = Roster::new();
        let err = roster.update_bowler(&Uuid::new_v4(), profile("X")).unwrap_err();
        assert_eq!(err.error_code(), "BOWLER_NOT_FOUND");
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut roster = Roster::new();
        let a = roster.add_bowler(profile("Ann")).unwrap();
        let b = roster.add_bowler(profile("Bo")).unwrap();
        roster.select(&a).unwrap();

        assert!(roster.remove_bowler(&b).is_some());
        assert_eq!(roster.last_selected(), Some(a));

        assert!(roster.remove_bowler(&a).is_some());
        assert!(roster.last_selected().is_none());
        assert!(roster.remove_bowler(&a).is_none());
    }

    #[test]
    fn test_import_regenerates_id() {
        let mut roster = Roster::new();
        let id = roster.add_bowler(profile("Ann")).unwrap();
        let copy = roster.get_bowler(&id).unwrap().clone();

        let new_id = roster.import_bowler(copy.clone()).unwrap();
        assert_ne!(new_id, id);
        assert_eq!(roster.bowler_count(), 2);

        let imported = roster.get_bowler(&new_id).unwrap();
        assert_eq!(imported.profile, copy.profile);
        assert_eq!(imported.last_target, copy.last_target);
    }

    #[test]
    fn test_find_bowler() {
        let mut roster = Roster::new();
        let ann = roster.add_bowler(profile("Ann")).unwrap();
        roster.add_bowler(profile("Bo")).unwrap();

        assert_eq!(roster.find_bowler("ANN").unwrap().id, ann);
        assert_eq!(roster.find_bowler(&ann.to_string()).unwrap().id, ann);
        assert_eq!(roster.find_bowler(&ann.to_string()[..13]).unwrap().id, ann);
        assert!(roster.find_bowler("Cy").is_err());
        assert!(roster.find_bowler(&Uuid::new_v4().to_string()).is_err());
    }

    #[test]
    fn test_find_bowler_ambiguous_name() {
        let mut roster = Roster::new();
        roster.add_bowler(profile("Sam")).unwrap();
        roster.add_bowler(profile("sam")).unwrap();
        let err = roster.find_bowler("Sam").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_select_unknown_bowler() {
        let mut roster = Roster::new();
        assert!(roster.select(&Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut roster = Roster::new();
        let id = roster.add_bowler(profile("Ann")).unwrap();
        let dup = roster.get_bowler(&id).unwrap().clone();
        roster.bowlers.push(dup);
        assert!(roster.validate().is_err());
    }

    #[test]
    fn test_validate_drops_dangling_selection() {
        let mut roster = Roster::new();
        roster.last_selected = Some(Uuid::new_v4());
        roster.validate().unwrap();
        assert!(roster.last_selected.is_none());
    }

    #[test]
    fn test_roster_serialization() {
        let mut roster = Roster::new();
        let id = roster.add_bowler(profile("Jane")).unwrap();
        roster.select(&id).unwrap();

        let json = serde_json::to_string_pretty(&roster).unwrap();
        assert!(json.contains("\"lastSelected\""));
        assert!(json.contains("\"defaultTarget\": 20"));
        assert!(json.contains("Jane"));

        let roundtrip: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.bowlers(), roster.bowlers());
        assert_eq!(roundtrip.last_selected(), Some(id));
    }
}
