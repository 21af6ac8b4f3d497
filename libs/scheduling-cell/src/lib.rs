pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ScheduleError, ScoringWeights, Suggestion};
pub use services::availability::{free_slots, slot_grid, AvailabilityService};
pub use services::suggestion::{rank_suggestions, SuggestionService};
