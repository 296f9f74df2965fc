pub mod browse;
pub mod catalog;
pub mod favorites;
pub mod ws;
