pub mod preprocessing;
pub mod morphology;
pub mod extraction;
pub mod simplification;
pub mod geometry;

pub use preprocessing::*;
pub use morphology::*;
pub use extraction::*;
pub use simplification::*;
pub use geometry::*;
