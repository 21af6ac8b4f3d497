pub mod flow;
pub mod nlp;
pub mod reports;

pub use flow::FlowService;
pub use nlp::{NlpService, QueryParser};
pub use reports::ReportService;
