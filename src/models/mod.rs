pub mod enums;
pub mod analysis;
pub mod contact;
pub mod alert;

pub use enums::*;
pub use analysis::*;
pub use contact::*;
pub use alert::*;
