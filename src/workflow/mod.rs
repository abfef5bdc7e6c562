pub mod decision_flow;
pub mod record_ctx;

pub use decision_flow::DecisionFlow;
pub use record_ctx::RecordCtx;
