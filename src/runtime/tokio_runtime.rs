//! Tokio runtime construction.

use tokio::runtime::{Builder, Runtime};

/// Build a multi-threaded runtime with `threads` workers, or one per CPU.
///
/// # Errors
///
/// Returns the I/O error from the runtime builder.
pub fn build_runtime(threads: Option<usize>) -> Result<Runtime, std::io::Error> {
    let worker_threads = threads.unwrap_or_else(num_cpus::get).max(1);
    tracing::debug!(worker_threads = worker_threads, "building tokio runtime");
    Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name("fetchlot-rt")
        .enable_all()
        .build()
}
