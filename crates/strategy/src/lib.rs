pub mod change_detector;
pub mod indicators;
pub mod scorer;
pub mod sentiment;
pub mod universe;
