pub mod model;
pub mod normalize;

pub use model::{Routine, Step};
pub use normalize::normalize;
