mod feedback;
mod thread;

pub use feedback::FeedbackRepository;
pub use thread::ThreadRepository;
