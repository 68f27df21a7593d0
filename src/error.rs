use thiserror::Error;

/// Errors returned by [`Simulation`](crate::sim::Simulation) operations.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("address {0} is outside the virtual address space")]
    InvalidAddress(usize),

    #[error("write access denied: page {0} lies in the read-only text segment")]
    PermissionDenied(usize),

    #[error("page fault on page {0} could not be serviced: no frame obtainable")]
    PageFault(usize),

    #[error("backing store failure: {0}")]
    ResourceInit(#[from] std::io::Error),
}

/// Result alias for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
