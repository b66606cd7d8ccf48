pub mod comment;
pub mod project;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentView};
pub use project::{Project, ProjectRef, ProjectView};
pub use task::{Task, TaskPriority, TaskRef, TaskStatus, TaskView};
pub use user::{User, UserRef};
