//! Parse worker and process isolation (§4.4).

pub mod isolated;
pub mod registry;
pub mod worker;

pub use isolated::{parse_in_child, run_as_child_if_requested};
pub use registry::{MapParserRegistry, ParserRegistry};
pub use worker::{parse_one, ParseWorkerConfig};
