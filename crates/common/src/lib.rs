pub mod error;

pub use error::{TandemError, TandemResult};
