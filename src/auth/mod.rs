pub mod brute_force;
pub mod credentials;
pub mod limits;
pub mod session;
