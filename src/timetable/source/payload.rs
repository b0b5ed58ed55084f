use crate::{
    payload::{self, Error, Payload, Record},
    shared::{Path, codec, polyline},
    timetable::{
        Calendar, Direction, Route, Service, ServiceDate, Timetable, TripBlock, TripGroup,
        VehicleType, WeekdayRule,
    },
};
use rayon::prelude::*;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Instant};
use tracing::debug;

/// Lookup tables every route needs while it is decoded.
struct Tables<'a> {
    dates: &'a [ServiceDate],
    route_types: &'a [VehicleType],
}

impl Timetable {
    pub fn load_payload(mut self, payload: &Payload) -> Result<Self, payload::Error> {
        let root = payload.root()?;
        self.load_header(&root)?;
        self.load_dates(&root)?;
        self.load_route_types(&root)?;
        self.load_routes(&root)?;
        self.generate_lookups();
        Ok(self)
    }

    fn load_header(&mut self, root: &Record) -> Result<(), payload::Error> {
        self.gtfs_epoch = root.optional_i64("gtfs_epoch")?;
        self.json_epoch = root.optional_i64("json_epoch")?;
        Ok(())
    }

    fn load_dates(&mut self, root: &Record) -> Result<(), payload::Error> {
        debug!("Loading dates...");
        let now = Instant::now();
        self.dates = root
            .str_list("dates")?
            .into_iter()
            .map(|text| ServiceDate::parse(text).ok_or_else(|| Error::InvalidDate(text.into())))
            .collect::<Result<_, _>>()?;
        debug!("Loading dates took {:?}", now.elapsed());
        Ok(())
    }

    fn load_route_types(&mut self, root: &Record) -> Result<(), payload::Error> {
        self.route_types = root
            .str_list("route_types")?
            .into_iter()
            .map(|name| {
                VehicleType::from_name(name).ok_or_else(|| Error::UnknownVehicleType(name.into()))
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn load_routes(&mut self, root: &Record) -> Result<(), payload::Error> {
        debug!("Loading routes...");
        let now = Instant::now();
        let records = root.records("routes", "route")?;
        let tables = Tables {
            dates: &self.dates,
            route_types: &self.route_types,
        };
        let routes: Vec<Route> = records
            .par_iter()
            .enumerate()
            .map(|(i, record)| decode_route(i as u32, record, &tables))
            .collect::<Result<_, _>>()?;
        self.routes = routes.into();
        debug!(
            "Loading {} routes took {:?}",
            self.routes.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn generate_lookups(&mut self) {
        let mut name_lookup: HashMap<Arc<str>, Vec<u32>> = HashMap::new();
        self.route_lookup = self
            .routes
            .iter()
            .map(|route| {
                name_lookup
                    .entry(route.name.clone())
                    .or_default()
                    .push(route.index);
                (route.id.clone(), route.index)
            })
            .collect();
        self.name_lookup = name_lookup
            .into_iter()
            .map(|(name, indexes)| (name, indexes.into()))
            .collect();
    }
}

fn out_of_range(route: &str, what: &'static str, index: usize, len: usize) -> Error {
    Error::OutOfRange {
        route: route.into(),
        what,
        index,
        len,
    }
}

fn checked<'a, T>(
    route: &str,
    what: &'static str,
    items: &'a [T],
    index: u32,
) -> Result<&'a T, Error> {
    items
        .get(index as usize)
        .ok_or_else(|| out_of_range(route, what, index as usize, items.len()))
}

fn undelta_codec_list(record: &Record, field: &'static str, text: &str) -> Result<Vec<u32>, Error> {
    codec::decode_integer_list(text)
        .and_then(|deltas| codec::undelta_list(&deltas))
        .map_err(|source| Error::Codec {
            kind: record.kind(),
            field,
            source,
        })
}

fn decode_route(index: u32, record: &Record, tables: &Tables) -> Result<Route, Error> {
    let id = record.str("id")?;
    let route_type = record.u32("type")?;
    let vehicle_type = *checked(id, "route type", tables.route_types, route_type)?;

    let shapes: Vec<Path> = record
        .str_list("shapes")?
        .into_iter()
        .map(|text| polyline::decode(text).map(Path::new))
        .collect::<Result<_, _>>()?;

    let stop_distances: Vec<Box<[u32]>> = record
        .str_list("stop_distances")?
        .into_iter()
        .map(|text| {
            Ok(undelta_codec_list(record, "stop_distances", text)?.into())
        })
        .collect::<Result<_, Error>>()?;

    let trip_groups: Vec<TripGroup> = record
        .records("trip_groups", "trip_group")?
        .iter()
        .map(|group| decode_trip_group(id, group, &shapes, &stop_distances))
        .collect::<Result<_, _>>()?;

    let calendars: Vec<Calendar> = record
        .records("trip_dates", "trip_dates")?
        .iter()
        .map(|dates| decode_calendar(id, dates, tables.dates))
        .collect::<Result<_, _>>()?;

    let directions = record
        .array("directions")?
        .iter()
        .map(|pair| decode_direction_pair(id, record, pair, &trip_groups))
        .collect::<Result<Vec<_>, _>>()?;

    let services: Vec<Service> = record
        .records("services", "service")?
        .iter()
        .map(|service| {
            let calendar = service.u32("trip_dates_i")?;
            checked(id, "trip dates", &calendars, calendar)?;
            let pair = service.u32("directions_i")?;
            checked(id, "direction pair", &directions, pair)?;
            Ok(Service {
                calendar,
                directions: pair,
            })
        })
        .collect::<Result<_, Error>>()?;

    Ok(Route {
        index,
        id: id.into(),
        name: record.str("name")?.into(),
        long_name: record.str("long_name")?.into(),
        vehicle_type,
        shapes: shapes.into(),
        stop_distances: stop_distances.into(),
        trip_groups: trip_groups.into(),
        calendars: calendars.into(),
        directions: directions.into(),
        services: services.into(),
    })
}

fn decode_trip_group(
    route: &str,
    record: &Record,
    shapes: &[Path],
    stop_distances: &[Box<[u32]>],
) -> Result<TripGroup, Error> {
    let shape_i = record.u32("shape_i")?;
    let stop_distances_i = record.u32("stop_distances_i")?;
    let shape = checked(route, "shape", shapes, shape_i)?;
    let points = checked(route, "stop distances", stop_distances, stop_distances_i)?;
    let distances = shape.distances_at(points).ok_or_else(|| {
        let index = points.iter().max().copied().unwrap_or_default();
        out_of_range(route, "shape point", index as usize, shape.len())
    })?;
    Ok(TripGroup {
        shape: shape_i,
        stop_distances: stop_distances_i,
        distances: distances.into(),
    })
}

fn decode_calendar(route: &str, record: &Record, dates: &[ServiceDate]) -> Result<Calendar, Error> {
    let date = |index: u32| checked(route, "date", dates, index).copied();
    let weekdays = match record.value("weekdays")? {
        Value::Number(number) => number
            .as_u64()
            .filter(|day| *day < 7)
            .map(|day| WeekdayRule::Single(day as u8))
            .ok_or_else(|| Error::InvalidWeekdays(number.to_string()))?,
        Value::String(mask) => {
            WeekdayRule::from_mask(mask).ok_or_else(|| Error::InvalidWeekdays(mask.clone()))?
        }
        other => return Err(Error::InvalidWeekdays(other.to_string())),
    };
    let exceptions = record.record("exception_dates", "exception_dates")?;
    let added = exceptions
        .u32_list("added")?
        .into_iter()
        .map(date)
        .collect::<Result<_, _>>()?;
    let removed = exceptions
        .u32_list("removed")?
        .into_iter()
        .map(date)
        .collect::<Result<_, _>>()?;
    Ok(Calendar {
        start: date(record.u32("start_date_i")?)?,
        end: date(record.u32("end_date_i")?)?,
        weekdays,
        added,
        removed,
    })
}

fn decode_direction_pair(
    route: &str,
    record: &Record,
    pair: &Value,
    trip_groups: &[TripGroup],
) -> Result<[Option<Direction>; 2], Error> {
    let wrong_type = || Error::WrongType {
        kind: record.kind(),
        field: "directions",
        expected: "pair of directions",
    };
    let slots = pair.as_array().filter(|slots| slots.len() == 2).ok_or_else(wrong_type)?;
    let mut directions = [None, None];
    for (slot, value) in directions.iter_mut().zip(slots) {
        let is_empty = value.as_array().is_some_and(Vec::is_empty) || value.is_null();
        if !is_empty {
            let direction = Record::new("direction", record.keys(), value)?;
            *slot = Some(decode_direction(route, &direction, trip_groups)?);
        }
    }
    Ok(directions)
}

fn decode_direction(
    route: &str,
    record: &Record,
    trip_groups: &[TripGroup],
) -> Result<Direction, Error> {
    let is_departure_times = record.u32("is_departure_times")? != 0;
    let stop_times: Vec<Arc<[u32]>> = record
        .str_list("stop_times")?
        .into_iter()
        .map(|text| {
            let times = undelta_codec_list(record, "stop_times", text)?;
            Ok(if is_departure_times {
                times.into()
            } else {
                // arrival doubles as departure
                times.iter().flat_map(|time| [*time, *time]).collect()
            })
        })
        .collect::<Result<_, Error>>()?;

    let trips = record.record("trips", "trips")?;
    let first_start_time = trips.u32("first_start_time")?;
    let start_times: Box<[u32]> = trips
        .undelta_integers("start_times")?
        .into_iter()
        .enumerate()
        .map(|(position, offset)| {
            first_start_time
                .checked_add(offset)
                .ok_or_else(|| Error::Codec {
                    kind: trips.kind(),
                    field: "start_times",
                    source: codec::Error::Overflow(position),
                })
        })
        .collect::<Result<_, _>>()?;
    let stop_times_indexes = trips.integers("stop_times_indexes")?;
    let trip_group_indexes = trips.integers("trip_group_indexes")?;

    if start_times.len() != stop_times_indexes.len()
        || start_times.len() != trip_group_indexes.len()
    {
        return Err(Error::TripListLength {
            route: route.into(),
            start_times: start_times.len(),
            stop_times: stop_times_indexes.len(),
            trip_groups: trip_group_indexes.len(),
        });
    }

    for (times_i, group_i) in stop_times_indexes.iter().zip(&trip_group_indexes) {
        let times = checked(route, "stop times", &stop_times, *times_i)?;
        let group = checked(route, "trip group", trip_groups, *group_i)?;
        if times.len() % 2 != 0 || times.len() < 2 || times.len() / 2 != group.distances.len() {
            return Err(Error::StopCount {
                route: route.into(),
                stops: times.len() / 2,
                distances: group.distances.len(),
            });
        }
    }

    Ok(Direction {
        is_departure_times,
        stop_times: stop_times.into(),
        trips: TripBlock {
            start_times,
            stop_times: stop_times_indexes.into(),
            trip_groups: trip_group_indexes.into(),
        },
    })
}
