pub mod identifier_reconciler;
pub mod output_parser;
pub mod project_patcher;

pub use identifier_reconciler::reconcile;
pub use output_parser::{FieldRecord, ParsedOutput, extract, keys, parse};
pub use project_patcher::{PatchRequest, build_description_path, patch};
