pub mod loaders;
pub mod programme;
pub mod record;

pub use loaders::{load_records_from_csv, read_records};
pub use programme::{programme_codes, resolve_search_token};
pub use record::{Decision, DecisionFilter, DecisionRecord, InvalidTransition, RecordStatus};
