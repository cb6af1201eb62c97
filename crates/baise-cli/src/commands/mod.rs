mod dispatch;
pub mod schema;
pub mod validate;

pub use dispatch::dispatch;
