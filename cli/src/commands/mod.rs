//! Command implementations

pub mod close;
pub mod configure;
pub mod create;
pub mod list_tasks;
pub mod version;

pub use close::CloseArgs;
pub use create::CreateArgs;
pub use list_tasks::ListTasksArgs;
