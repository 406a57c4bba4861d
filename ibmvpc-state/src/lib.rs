//! ibmvpc State Management
//!
//! Persists what the `ibmvpc` host has applied: one entry per managed
//! resource with its remote identifier and last read attributes.
//!
//! - **StateFile**: all managed resources plus serial/lineage bookkeeping
//! - **StateBackend**: storage trait; `LocalBackend` keeps a JSON file next to
//!   a `.lock` file
//! - **LockInfo**: who holds the state and for which operation
//!
//! ```ignore
//! let backend = create_backend(&BackendConfig::local())?;
//! let lock = backend.acquire_lock("apply").await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//! // ... apply ...
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;

pub use backend::{BackendConfig, BackendError, BackendResult, StateBackend};
pub use backends::{LocalBackend, create_backend};
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
