pub mod enums;
pub mod prescription;
pub mod order;
pub mod notification;
pub mod dashboard;
pub mod filters;

pub use enums::*;
pub use prescription::*;
pub use order::*;
pub use notification::*;
pub use dashboard::*;
pub use filters::*;
