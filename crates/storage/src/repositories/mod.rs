pub mod overnight_repo;
pub mod sent_alerts_repo;
pub mod snapshot_repo;

pub use overnight_repo::OvernightRepository;
pub use sent_alerts_repo::SentAlertsRepository;
pub use snapshot_repo::SnapshotRepository;
