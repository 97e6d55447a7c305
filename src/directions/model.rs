/// Travel mode accepted by the legacy Directions API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DirectionsMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl DirectionsMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

/// Route features to avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Avoid {
    Tolls,
    Highways,
    Ferries,
    Indoor,
}

impl Avoid {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tolls => "tolls",
            Self::Highways => "highways",
            Self::Ferries => "ferries",
            Self::Indoor => "indoor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficModel {
    BestGuess,
    Pessimistic,
    Optimistic,
}

impl TrafficModel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestGuess => "best_guess",
            Self::Pessimistic => "pessimistic",
            Self::Optimistic => "optimistic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitMode {
    Bus,
    Subway,
    Train,
    Tram,
    Rail,
}

impl TransitMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Subway => "subway",
            Self::Train => "train",
            Self::Tram => "tram",
            Self::Rail => "rail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitRoutingPreference {
    LessWalking,
    FewerTransfers,
}

impl TransitRoutingPreference {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LessWalking => "less_walking",
            Self::FewerTransfers => "fewer_transfers",
        }
    }
}

/// Departure time: the literal `now` or seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepartureTime {
    Now,
    At(i64),
}

impl DepartureTime {
    pub(crate) fn to_param(self) -> String {
        match self {
            Self::Now => "now".to_string(),
            Self::At(ts) => ts.to_string(),
        }
    }
}

/// Response format; selects the final path segment of the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Json,
    /// XML responses are normalized into the same JSON value shape.
    Xml,
}

impl OutputFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

pub(crate) fn join_pipe<T: Copy>(items: &[T], f: fn(T) -> &'static str) -> String {
    items.iter().map(|&i| f(i)).collect::<Vec<_>>().join("|")
}
