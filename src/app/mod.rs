pub mod dispatch;
pub mod walk;
