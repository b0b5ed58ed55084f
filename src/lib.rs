pub mod payload;
pub mod shared;
pub mod simulation;
pub mod timetable;

pub mod prelude {
    pub use crate::payload::Payload;
    pub use crate::shared::{Coordinate, Distance, Heading, Path, Time};
    pub use crate::simulation::{Config, Inbox, Simulation, TickReport, TripUpdate};
    pub use crate::timetable::{Route, ServiceDate, Timetable, VehicleType};
}
