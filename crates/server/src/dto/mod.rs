mod dataset;
mod live;
mod subscription;
pub use dataset::*;
pub use live::*;
pub use subscription::*;
