//! Match Lifecycle
//!
//! The controller that sits between the renderer/input boundary and the
//! per-frame simulation.

pub mod controller;

pub use controller::{
    ControllerSnapshot, ControllerState, FrameReport, MatchController, MatchError, MatchSummary,
    WinnerInfo, ROSTER_SIZE,
};
