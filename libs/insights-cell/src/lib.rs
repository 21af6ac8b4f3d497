pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{FlowPrediction, InsightsError, ParsedQuery, QueryIntent, ReportSummary};
pub use services::{FlowService, NlpService, QueryParser, ReportService};
