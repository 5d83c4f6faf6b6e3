pub mod coordinator;

pub use coordinator::{SingleInstanceCoordinator, SingleInstanceResult};
