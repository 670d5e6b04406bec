//! Built-in city list used for search suggestions.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    pub region: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    const fn new(
        name: &'static str,
        country: &'static str,
        region: &'static str,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self { name, country, region, latitude, longitude }
    }

    fn matches(&self, needle: &str) -> bool {
        [self.name, self.country, self.region]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

pub const CITIES: [City; 16] = [
    City::new("New York", "United States", "New York", 40.7128, -74.0060),
    City::new("London", "United Kingdom", "England", 51.5074, -0.1278),
    City::new("Tokyo", "Japan", "Kanto", 35.6762, 139.6503),
    City::new("Paris", "France", "Île-de-France", 48.8566, 2.3522),
    City::new("Sydney", "Australia", "New South Wales", -33.8688, 151.2093),
    City::new("Mumbai", "India", "Maharashtra", 19.0760, 72.8777),
    City::new("Dubai", "UAE", "Dubai", 25.2048, 55.2708),
    City::new("Singapore", "Singapore", "Central", 1.3521, 103.8198),
    City::new("Los Angeles", "United States", "California", 34.0522, -118.2437),
    City::new("Chicago", "United States", "Illinois", 41.8781, -87.6298),
    City::new("Toronto", "Canada", "Ontario", 43.6532, -79.3832),
    City::new("Berlin", "Germany", "Berlin", 52.5200, 13.4050),
    City::new("Madrid", "Spain", "Madrid", 40.4168, -3.7038),
    City::new("Rome", "Italy", "Lazio", 41.9028, 12.4964),
    City::new("Bangkok", "Thailand", "Bangkok", 13.7563, 100.5018),
    City::new("Seoul", "South Korea", "Seoul", 37.5665, 126.9780),
];

/// Offered when the user has not typed anything yet.
pub const QUICK_CITIES: [&str; 8] =
    ["London", "New York", "Tokyo", "Paris", "Sydney", "Dubai", "Singapore", "Berlin"];

pub const MIN_QUERY_LEN: usize = 2;

/// Cities whose name, country or region contains `query`, in table order.
pub fn suggest(query: &str, limit: usize) -> Vec<&'static City> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    CITIES.iter().filter(|city| city.matches(&needle)).take(limit).collect()
}
