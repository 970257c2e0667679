pub mod poller;
pub mod remote;
pub mod traits;

pub use poller::UniversePoller;
pub use traits::QuoteProvider;
