pub mod driver;
pub mod filter;
pub mod ingest;
pub mod output;
pub mod overrides;
pub mod render;
pub mod store;

pub use driver::{Outcome, Pipeline, PipelineError, PipelineOptions, RunReport, process_record};
pub use filter::{DropReason, DroppedReport, Verdict, is_good, verdict};
pub use output::{LINE_BREAK_TOKEN, TsvOutput, card_line};
pub use overrides::{OverrideTable, load_skip_list};
pub use render::{Flashcard, RenameMode, render};
pub use store::{HeadwordStore, JsonLinesStore};
