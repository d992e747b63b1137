pub mod replay;
pub mod synthetic;

pub use replay::ReplayBackend;
pub use synthetic::SyntheticBackend;
