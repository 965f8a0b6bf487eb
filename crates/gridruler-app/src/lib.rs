//! GridRuler Application
//!
//! Headless host for the ruler extension: replays scripted pointer and
//! keyboard events against an in-memory scene.

mod replay;

pub use replay::{Outcome, ReplayError, Script, ScriptEvent, run};
