pub mod catch;
pub mod problem;
