pub mod airspeed;
pub mod compensate;
pub mod filter;
