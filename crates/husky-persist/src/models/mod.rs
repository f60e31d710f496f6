pub mod feedback;
pub mod thread;

pub use feedback::FeedbackRecord;
pub use thread::{ThreadDescriptor, ThreadRecord, Turn};
