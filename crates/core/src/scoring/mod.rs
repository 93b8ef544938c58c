pub mod confidence;
pub mod recommendation;
pub mod risk;
pub mod sighting;
pub mod stability;
pub mod velocity;
