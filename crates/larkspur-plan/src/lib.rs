//! Larkspur Plan
//!
//! This crate provides the plan data model for larkspur research workflows.
//! A plan is the structured output of the planning stage: a title, a
//! rationale, a locale, a sufficiency flag, and an ordered list of steps.
//!
//! Key pieces:
//! - [`Plan`] / [`Step`] - the validated plan model
//! - [`PlanDraft`] - a plan that may still be raw, unparsed planner output
//! - [`classify`] - the keyword classifier used for both worker dispatch
//!   and deadline selection

mod classify;
mod error;
mod plan;

pub use classify::{TaskCategory, classify};
pub use error::PlanError;
pub use plan::{Plan, PlanDraft, Step, StepType};
