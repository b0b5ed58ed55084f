use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bus,
    Train,
    Tram,
    Metro,
    Ferry,
    Airplane,
}

impl VehicleType {
    pub const ALL: [VehicleType; 6] = [
        Self::Bus,
        Self::Train,
        Self::Tram,
        Self::Metro,
        Self::Ferry,
        Self::Airplane,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Tram => "tram",
            Self::Metro => "metro",
            Self::Ferry => "ferry",
            Self::Airplane => "airplane",
        }
    }

    /// Marker colour as a css hex string.
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Bus => "#007ac9",
            Self::Train => "#8c4799",
            Self::Tram => "#00985f",
            Self::Metro => "#ff6319",
            Self::Ferry => "#00b9e4",
            Self::Airplane => "#333333",
        }
    }

    /// Vehicle type for a basic or extended GTFS `route_type` code.
    pub fn from_route_type(code: i64) -> Option<Self> {
        match code {
            0 | 900..=999 => Some(Self::Tram),
            1 | 400..=499 => Some(Self::Metro),
            2 | 100..=199 => Some(Self::Train),
            3 | 700..=799 => Some(Self::Bus),
            4 | 1000..=1099 => Some(Self::Ferry),
            1100..=1199 => Some(Self::Airplane),
            _ => None,
        }
    }

    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[test]
fn vehicle_type_names_test() {
    for kind in VehicleType::ALL {
        assert_eq!(VehicleType::from_name(kind.name()), Some(kind));
        assert_eq!(VehicleType::ALL[kind.index()], kind);
    }
    assert_eq!(VehicleType::from_name("zeppelin"), None);
    assert_eq!(VehicleType::from_route_type(3), Some(VehicleType::Bus));
    assert_eq!(VehicleType::from_route_type(109), Some(VehicleType::Train));
    assert_eq!(VehicleType::from_route_type(7), None);
}
