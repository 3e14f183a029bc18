//! Run orchestration and runtime adapters.

pub mod driver;
pub mod tokio_runtime;

pub use driver::Driver;
pub use tokio_runtime::build_runtime;
