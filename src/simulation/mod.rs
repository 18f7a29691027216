pub mod error;
pub mod states;
pub mod params;
pub mod forces;
pub mod spatial_hash;
pub mod constraint;
pub mod collision;
pub mod regions;
pub mod solver;
pub mod scenario;
