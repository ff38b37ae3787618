pub mod outline;

pub use outline::{parse_mastery_payload, GeneratedOutline, OutlineService};
