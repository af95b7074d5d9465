pub mod contact_intake;

pub use contact_intake::{ContactIntake, SubmissionOutcome, SubmissionResponse};
