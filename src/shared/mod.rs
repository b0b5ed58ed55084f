pub mod codec;
pub mod geo;
pub mod path;
pub mod polyline;
pub mod time;

pub use geo::*;
pub use path::*;
pub use time::*;
