//! Command handlers. Each one opens the roster, does its work, prints, and
//! saves when it changed something.

use std::path::{Path, PathBuf};

use anyhow::Context;
use lane_core::bowler::{Bowler, BowlerProfile, DriftDirection, Handedness};
use lane_core::calculations::CalculationResult;
use lane_core::file_io::{load_or_create_roster, save_roster, FileLock};
use lane_core::roster::Roster;
use lane_core::session::CalculatorSession;
use lane_core::share;
use tracing::info;

/// A roster loaded from disk, optionally holding the write lock.
pub struct RosterFile {
    path: PathBuf,
    pub roster: Roster,
    _lock: Option<FileLock>,
}

impl RosterFile {
    /// Load for reading only.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let roster = load_or_create_roster(path)?;
        Ok(RosterFile {
            path: path.to_path_buf(),
            roster,
            _lock: None,
        })
    }

    /// Lock, then load, so nobody else can save in between.
    pub fn open_for_write(path: &Path, user_id: &str) -> anyhow::Result<Self> {
        let lock = FileLock::acquire(path, user_id)?;
        let roster = load_or_create_roster(path)?;
        Ok(RosterFile {
            path: path.to_path_buf(),
            roster,
            _lock: Some(lock),
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        save_roster(&self.roster, &self.path)
            .with_context(|| format!("saving roster to {}", self.path.display()))
    }
}

/// Profile fields given on the command line. Unset fields keep their
/// current value on edit, or the form default on add.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProfileArgs {
    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Throwing hand: right or left
    #[arg(short = 'H', long, value_parser = parse_handedness)]
    pub hand: Option<Handedness>,

    /// Boards of drift between stance and release
    #[arg(short, long)]
    pub drift: Option<u32>,

    /// Drift direction: left, right or none
    #[arg(short = 'D', long, value_parser = parse_drift_direction)]
    pub drift_direction: Option<DriftDirection>,

    /// Boards between the ball and the slide foot at release
    #[arg(short, long, allow_negative_numbers = true)]
    pub lay_down: Option<i32>,
}

impl ProfileArgs {
    /// Overlay the given fields onto a profile.
    pub fn apply(self, mut profile: BowlerProfile) -> BowlerProfile {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(hand) = self.hand {
            profile.handedness = hand;
        }
        if let Some(drift) = self.drift {
            profile.drift = drift;
        }
        if let Some(direction) = self.drift_direction {
            profile.drift_direction = direction;
        }
        if let Some(lay_down) = self.lay_down {
            profile.lay_down_distance = lay_down;
        }
        profile
    }
}

fn parse_handedness(s: &str) -> Result<Handedness, String> {
    Handedness::from_str_flexible(s).map_err(|e| e.to_string())
}

fn parse_drift_direction(s: &str) -> Result<DriftDirection, String> {
    DriftDirection::from_str_flexible(s).map_err(|e| e.to_string())
}

pub fn list(file: &RosterFile) -> anyhow::Result<()> {
    if let Some(holder) = FileLock::check(&file.path) {
        eprintln!(
            "Note: {} ({}) has had this roster open for editing since {}",
            holder.user_id,
            holder.machine,
            holder.locked_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let roster = &file.roster;
    if roster.bowler_count() == 0 {
        println!("Roster is empty. Add a bowler with `strikepath add --name <NAME>`.");
        return Ok(());
    }

    let selected = roster.last_selected();
    println!("Rosters - Bowler Constants");
    println!("==========================");
    for bowler in roster.bowlers() {
        let marker = if Some(bowler.id) == selected { "*" } else { " " };
        println!(
            "{} {}  {:<20} {}",
            marker,
            short_id(bowler),
            bowler.name(),
            bowler.summary()
        );
    }
    Ok(())
}

pub fn add(file: &mut RosterFile, args: ProfileArgs) -> anyhow::Result<()> {
    if args.name.is_none() {
        anyhow::bail!("a name is required: --name <NAME>");
    }
    let profile = args.apply(BowlerProfile::default());
    let id = file.roster.add_bowler(profile)?;

    // The first bowler becomes the selection, like the web app does
    if file.roster.last_selected().is_none() {
        file.roster.select(&id)?;
    }
    file.save()?;

    let bowler = file.roster.get_bowler(&id).context("bowler vanished after add")?;
    info!(%id, name = bowler.name(), "bowler added");
    println!("Added {} ({})", bowler.name(), id);
    Ok(())
}

pub fn edit(file: &mut RosterFile, query: &str, args: ProfileArgs) -> anyhow::Result<()> {
    let bowler = file.roster.find_bowler(query)?;
    let id = bowler.id;
    let profile = args.apply(bowler.profile.clone());
    file.roster.update_bowler(&id, profile)?;
    file.save()?;

    if let Some(bowler) = file.roster.get_bowler(&id) {
        println!("Updated {}: {}", bowler.name(), bowler.summary());
    }
    Ok(())
}

pub fn delete(file: &mut RosterFile, query: &str) -> anyhow::Result<()> {
    let id = file.roster.find_bowler(query)?.id;
    if let Some(removed) = file.roster.remove_bowler(&id) {
        file.save()?;
        info!(%id, "bowler deleted");
        println!("Deleted {}", removed.name());
    }
    Ok(())
}

pub fn select(file: &mut RosterFile, query: &str) -> anyhow::Result<()> {
    let id = file.roster.find_bowler(query)?.id;
    let mut session = CalculatorSession::new();
    session.select(&mut file.roster, &id)?;
    file.save()?;

    if let Some(bowler) = session.selected_bowler(&file.roster) {
        println!(
            "Selected {} (target {}, breakpoint {})",
            bowler.name(),
            session.target_board(),
            session.breakpoint_board()
        );
    }
    Ok(())
}

/// Inputs of the `calc` command
pub struct CalcRequest<'a> {
    pub bowler: Option<&'a str>,
    pub target: Option<i32>,
    pub breakpoint: Option<i32>,
    pub json: bool,
}

pub fn calc(file: &mut RosterFile, request: CalcRequest<'_>) -> anyhow::Result<()> {
    let mut session = CalculatorSession::restore(&file.roster);
    let mut changed = false;

    if let Some(query) = request.bowler {
        let id = file.roster.find_bowler(query)?.id;
        session.select(&mut file.roster, &id)?;
        changed = true;
    }
    if let Some(target) = request.target {
        let applied = session.set_target(&mut file.roster, target);
        if applied != target {
            eprintln!("Target board clamped to {}", applied);
        }
        changed = true;
    }
    if let Some(breakpoint) = request.breakpoint {
        let applied = session.set_breakpoint(&mut file.roster, breakpoint);
        if applied != breakpoint {
            eprintln!("Breakpoint board clamped to {}", applied);
        }
        changed = true;
    }

    let result = session.result(&file.roster);
    let bowler = session.selected_bowler(&file.roster);

    match (bowler, result) {
        (Some(bowler), Some(result)) => {
            if request.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(bowler, &session, &result);
            }
        }
        _ => {
            if request.json {
                println!("null");
            } else {
                println!("Select a bowler to calculate stance.");
            }
        }
    }

    if changed {
        file.save()?;
    }
    Ok(())
}

fn print_result(bowler: &Bowler, session: &CalculatorSession, result: &CalculationResult) {
    println!("═══════════════════════════════════════");
    println!("  LANE MATH - {}", bowler.name());
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Arrow target:  {}", session.target_board());
    println!("  Breakpoint:    {}", session.breakpoint_board());
    println!("  Bowler:        {}", bowler.summary());
    println!();
    println!("Working:");
    println!("  x = target - breakpoint = {}", result.x);
    println!("  y = ceil(x / 2)         = {}", result.y);
    println!();
    println!("  Ball laydown:  {}", result.ball_lay_down_board);
    println!("  Slide board:   {}", result.slide_foot_board);
    println!();
    println!("═══════════════════════════════════════");
    println!("  NON-DOMINANT STANCE FOOT: {}", result.stance_foot_board);
    println!("═══════════════════════════════════════");
}

pub fn share_link(file: &RosterFile, query: &str, base_url: &str) -> anyhow::Result<()> {
    let bowler = file.roster.find_bowler(query)?;
    let url = share::share_url(base_url, bowler)?;
    println!("StrikePath: {}", bowler.name());
    println!("{}", url);
    Ok(())
}

pub fn import(file: &mut RosterFile, input: &str) -> anyhow::Result<()> {
    let token = share::token_from_url(input);
    let bowler = share::decode_bowler(&token).context("importing shared profile")?;

    println!("Importing {}", bowler.name());
    println!("  Target:     {}", bowler.target_or_default());
    println!("  Breakpoint: {}", bowler.breakpoint_or_default());
    println!("  Hand:       {}", bowler.profile.handedness);

    let id = file.roster.import_bowler(bowler)?;
    let mut session = CalculatorSession::new();
    session.select(&mut file.roster, &id)?;
    file.save()?;

    info!(%id, "shared bowler imported");
    println!("Imported as {} and selected.", id);
    Ok(())
}

fn short_id(bowler: &Bowler) -> String {
    bowler.id.to_string().chars().take(8).collect()
}
