pub mod browse;
pub mod movie;

pub use browse::*;
pub use movie::*;
