// Reasoning module - prompt construction and intent planning
pub mod planner;
pub mod prompts;

pub use planner::{fallback_intent, strip_code_fences, IntentPlanner};
