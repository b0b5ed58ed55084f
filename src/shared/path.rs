use crate::shared::geo::{Coordinate, Distance, Heading};

/// A decoded shape with the distance travelled at every point.
#[derive(Debug, Clone, Default)]
pub struct Path {
    points: Box<[Coordinate]>,
    cumulative: Box<[f64]>,
}

/// Closest point on a path to some measured coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub coordinate: Coordinate,
    /// Distance along the path.
    pub distance: Distance,
    /// Distance between the measured coordinate and the path.
    pub offset: Distance,
    pub heading: Heading,
}

impl Path {
    pub fn new(points: Vec<Coordinate>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += points[i - 1].distance(point).as_meters();
            }
            cumulative.push(total);
        }
        Self {
            points: points.into(),
            cumulative: cumulative.into(),
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length(&self) -> Distance {
        Distance::from_meters(self.cumulative.last().copied().unwrap_or_default())
    }

    /// Rounded distance in meters at each of the given point indexes.
    /// Returns `None` when an index is outside the path.
    pub fn distances_at(&self, point_indexes: &[u32]) -> Option<Vec<u32>> {
        point_indexes
            .iter()
            .map(|i| {
                self.cumulative
                    .get(*i as usize)
                    .map(|meters| meters.round() as u32)
            })
            .collect()
    }

    fn segment_heading(&self, segment: usize) -> Heading {
        match (self.points.get(segment), self.points.get(segment + 1)) {
            (Some(a), Some(b)) => a.heading_to(b),
            _ => Heading::default(),
        }
    }

    /// Position and heading after travelling `distance` along the path.
    /// Distances outside the path are clamped to its ends.
    pub fn position_at(&self, distance: Distance) -> Option<(Coordinate, Heading)> {
        let first = *self.points.first()?;
        if self.points.len() == 1 {
            return Some((first, Heading::default()));
        }
        let last_segment = self.points.len() - 2;
        let meters = distance.as_meters().clamp(0.0, self.length().as_meters());
        let segment = self
            .cumulative
            .partition_point(|d| *d <= meters)
            .saturating_sub(1)
            .min(last_segment);

        let (a, b) = (self.points[segment], self.points[segment + 1]);
        let length = self.cumulative[segment + 1] - self.cumulative[segment];
        let fraction = if length > 0.0 {
            (meters - self.cumulative[segment]) / length
        } else {
            0.0
        };
        Some((a.interpolate(&b, fraction), self.segment_heading(segment)))
    }

    /// Nearest point on the path to `coordinate`.
    pub fn project(&self, coordinate: &Coordinate) -> Option<Projection> {
        let first = *self.points.first()?;
        if self.points.len() == 1 {
            return Some(Projection {
                coordinate: first,
                distance: Distance::default(),
                offset: first.distance(coordinate),
                heading: Heading::default(),
            });
        }
        self.points
            .windows(2)
            .enumerate()
            .map(|(segment, pair)| {
                let fraction = coordinate.segment_fraction(&pair[0], &pair[1]);
                let foot = pair[0].interpolate(&pair[1], fraction);
                let length = self.cumulative[segment + 1] - self.cumulative[segment];
                Projection {
                    coordinate: foot,
                    distance: Distance::from_meters(self.cumulative[segment] + length * fraction),
                    offset: foot.distance(coordinate),
                    heading: self.segment_heading(segment),
                }
            })
            .min_by(|a, b| a.offset.as_meters().total_cmp(&b.offset.as_meters()))
    }
}

#[cfg(test)]
fn straight_path() -> Path {
    Path::new(vec![
        Coordinate::new(60.0, 24.0),
        Coordinate::new(60.0, 24.01),
        Coordinate::new(60.01, 24.01),
    ])
}

#[test]
fn cumulative_test() {
    let path = straight_path();
    let distances = path.distances_at(&[0, 1, 2]).unwrap();
    assert_eq!(distances[0], 0);
    assert!((distances[1] as f64 - 556.0).abs() < 2.0);
    assert!((distances[2] as f64 - 1668.0).abs() < 3.0);
    assert!(path.distances_at(&[3]).is_none());
}

#[test]
fn position_at_test() {
    let path = straight_path();
    let (start, heading) = path.position_at(Distance::from_meters(-10.0)).unwrap();
    assert!(start.distance(&Coordinate::new(60.0, 24.0)).as_meters() < 0.01);
    assert!((heading.as_degrees() - 90.0).abs() < 0.1);

    let (end, heading) = path.position_at(Distance::from_meters(1e6)).unwrap();
    assert!(end.distance(&Coordinate::new(60.01, 24.01)).as_meters() < 0.01);
    assert!(heading.as_degrees().abs() < 1e-6);
}

#[test]
fn project_test() {
    let path = straight_path();
    let measured = Coordinate::new(60.0002, 24.005);
    let projection = path.project(&measured).unwrap();
    assert!((projection.offset.as_meters() - 22.2).abs() < 1.0);
    assert!((projection.distance.as_meters() - 278.0).abs() < 2.0);
    assert!((projection.heading.as_degrees() - 90.0).abs() < 0.1);
}
