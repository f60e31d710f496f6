pub mod docs;
pub mod feedback;
pub mod health;
pub mod threads;
pub mod tools;
