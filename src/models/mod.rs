pub mod maintenance;
pub mod payment;
pub mod property;
pub mod tenant;
pub mod user;
pub mod view;

pub use maintenance::*;
pub use payment::*;
pub use property::*;
pub use tenant::*;
pub use user::*;
pub use view::*;
