pub mod validate;
pub mod score;

pub use validate::*;
pub use score::*;
