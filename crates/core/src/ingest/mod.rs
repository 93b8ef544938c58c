pub mod array;
pub mod extract;
pub mod normalize;
pub mod offers;
pub mod provider;
pub mod types;
