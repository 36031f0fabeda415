pub mod record;

pub use record::{AuthOutcome, Credentials, Record, RecordSet};
