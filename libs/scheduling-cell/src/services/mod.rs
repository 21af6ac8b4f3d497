pub mod availability;
pub mod suggestion;

pub use availability::AvailabilityService;
pub use suggestion::SuggestionService;
