pub mod winners;

pub use winners as winner_entity;
