pub mod lifecycle;
pub mod tournament;
