pub mod authenticated;
pub mod sign_in;
