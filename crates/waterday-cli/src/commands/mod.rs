pub mod config;
pub mod drink;
pub mod goal;
pub mod remind;
