pub mod contract;
pub mod economics;
pub mod history;
pub mod recommendation;
pub mod scores;
pub mod sighting;
pub mod snapshot;
