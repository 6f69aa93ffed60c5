//! Native adapters for `support-widget-core`.

mod file_store;
mod gateway;
mod scheduler;

pub use file_store::{FileSessionStore, FileStoreError, default_session_path};
pub use gateway::ReqwestSupportGateway;
pub use scheduler::TokioPollScheduler;
