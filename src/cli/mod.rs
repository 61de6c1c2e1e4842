pub mod profile;
pub mod serve;
