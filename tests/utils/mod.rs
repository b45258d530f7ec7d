pub mod fake;
pub mod testfs;
