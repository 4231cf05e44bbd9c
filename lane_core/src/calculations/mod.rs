//! # Lane Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(...)` - Pure calculation function, no I/O and no state
//!
//! ## Available Calculations
//!
//! - [`alignment`] - Stance foot position from target and breakpoint boards

pub mod alignment;

// Re-export commonly used types
pub use alignment::{calculate, AlignmentInput, CalculationResult};
