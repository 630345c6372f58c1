pub mod draw_service;
pub mod report_service;
pub mod winner_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use draw_service::*;
pub use report_service::*;
pub use winner_store::*;
