//! Map links to `geo:` URIs.
//!
//! Three href dialects carry coordinates:
//! - `poimap2.php?lat=..&lon=..`
//! - `geohack.php?params=..` (decimal `lat;lon` or degree/minute/second tokens)
//! - `/wiki/Special:Map/zoom/lat/lon`

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::query_values;

lazy_static! {
    // These patterns are hardcoded and syntactically valid.
    static ref POIMAP2_RE: Regex = Regex::new(r"(?i)poimap2\.php")
        .expect("BUG: hardcoded poimap2 regex is invalid");
    static ref GEOHACK_RE: Regex = Regex::new(r"(?i)geohack\.php")
        .expect("BUG: hardcoded geohack regex is invalid");
    static ref SPECIAL_MAP_RE: Regex = Regex::new(r"(?i)Special:Map")
        .expect("BUG: hardcoded Special:Map regex is invalid");
    static ref FLOAT_PREFIX_RE: Regex =
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("BUG: hardcoded float regex is invalid");
}

/// Divisors for degrees, minutes and seconds.
const DMS_FACTORS: [f64; 3] = [1.0, 60.0, 3600.0];

/// At most degrees, minutes, seconds and a hemisphere letter.
const DMS_MAX_TOKENS: usize = 4;

const LAT_HEMISPHERES: &[(&str, f64)] = &[("N", 1.0), ("S", -1.0)];
const LON_HEMISPHERES: &[(&str, f64)] = &[("E", 1.0), ("W", -1.0), ("O", 1.0)];

/// A point on earth. Only built from finite values.
///
/// Coordinates written as plain decimals in the href (`lat;lon` pairs and
/// `Special:Map` segments) keep their source text in the URI.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
    literal: Option<(String, String)>,
}

impl GeoCoordinate {
    /// `None` unless both values are finite.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        (lat.is_finite() && lon.is_finite()).then_some(Self {
            // + 0.0 turns -0 into 0
            lat: lat + 0.0,
            lon: lon + 0.0,
            literal: None,
        })
    }

    /// Coordinates given as decimal text, rendered back as written.
    ///
    /// `None` when either value is blank or not a finite decimal.
    #[must_use]
    pub fn from_literal(lat: &str, lon: &str) -> Option<Self> {
        let (lat, lon) = (lat.trim(), lon.trim());
        let mut coordinate = Self::new(parse_decimal(lat)?, parse_decimal(lon)?)?;
        coordinate.literal = Some((lat.to_string(), lon.to_string()));
        Some(coordinate)
    }

    /// `geo:{lat},{lon}`
    #[must_use]
    pub fn to_geo_uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some((lat, lon)) => write!(f, "geo:{lat},{lon}"),
            None => write!(f, "geo:{},{}", self.lat, self.lon),
        }
    }
}

/// Href shapes that carry coordinates, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoDialect {
    Poimap2,
    Geohack,
    SpecialMap,
}

/// First dialect whose marker appears in `href`.
#[must_use]
pub fn detect_dialect(href: &str) -> Option<GeoDialect> {
    if POIMAP2_RE.is_match(href) {
        Some(GeoDialect::Poimap2)
    } else if GEOHACK_RE.is_match(href) {
        Some(GeoDialect::Geohack)
    } else if SPECIAL_MAP_RE.is_match(href) {
        Some(GeoDialect::SpecialMap)
    } else {
        None
    }
}

/// Coordinates carried by a map link, if any.
#[must_use]
pub fn extract_coordinates(href: &str) -> Option<GeoCoordinate> {
    match detect_dialect(href)? {
        GeoDialect::Poimap2 => from_poimap2(href),
        GeoDialect::Geohack => from_geohack(href),
        GeoDialect::SpecialMap => from_special_map(href),
    }
}

fn from_poimap2(href: &str) -> Option<GeoCoordinate> {
    let lat = query_values(href, "lat").first().map_or(f64::NAN, |v| parse_float_prefix(v));
    let lon = query_values(href, "lon").first().map_or(f64::NAN, |v| parse_float_prefix(v));
    GeoCoordinate::new(lat, lon)
}

fn from_geohack(href: &str) -> Option<GeoCoordinate> {
    let params = select_geohack_params(query_values(href, "params"))?;

    let head = params.split('_').next().unwrap_or_default();
    if let Some((lat, lon)) = head.split_once(';')
        && !lon.contains(';')
    {
        return GeoCoordinate::from_literal(lat, lon);
    }

    let upper = params.to_uppercase();
    let pieces: Vec<&str> = upper.split('_').collect();

    let (lat, cursor) = parse_dms(&pieces, 0, LAT_HEMISPHERES);
    let (lon, _) = parse_dms(&pieces, cursor, LON_HEMISPHERES);
    GeoCoordinate::new(lat, lon)
}

/// Pick the `params` value to decode.
///
/// A single value is used as is. Among several, the first one starting with
/// a digit or whitespace wins; an empty value stops the search.
fn select_geohack_params(values: Vec<String>) -> Option<String> {
    let chosen = if values.len() == 1 {
        values.into_iter().next()
    } else {
        values.into_iter().find(|v| {
            v.chars()
                .next()
                .is_none_or(|c| c.is_ascii_digit() || c.is_whitespace())
        })
    };
    chosen.filter(|v| !v.is_empty())
}

/// Parse one degree/minute/second group starting at `start`.
///
/// Returns the signed value and the index right after the hemisphere token.
/// A group without hemisphere token is NaN and leaves the cursor at `start`;
/// a group with no tokens at all is 0.
fn parse_dms(pieces: &[&str], start: usize, hemispheres: &[(&str, f64)]) -> (f64, usize) {
    let mut value = 0.0;

    for (i, token) in pieces.iter().skip(start).take(DMS_MAX_TOKENS).enumerate() {
        if let Some(&(_, sign)) = hemispheres.iter().find(|(h, _)| h == token) {
            return (value * sign, start + i + 1);
        }
        value += match DMS_FACTORS.get(i) {
            Some(factor) => numeric_value(token) / factor,
            None => f64::NAN,
        };
    }

    if start >= pieces.len() {
        (0.0, start)
    } else {
        (f64::NAN, start)
    }
}

/// Numeric value of a whole token: blank is 0, garbage is NaN.
fn numeric_value(token: &str) -> f64 {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Strict decimal used for literal coordinates: blank is rejected.
fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok().filter(|v: &f64| v.is_finite())
}

/// Value of the longest numeric prefix (`"48.85abc"` is 48.85), NaN if none.
fn parse_float_prefix(text: &str) -> f64 {
    FLOAT_PREFIX_RE
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(f64::NAN)
}

/// Segments 4 and 5 of `/wiki/Special:Map/{zoom}/{lat}/{lon}`.
fn from_special_map(href: &str) -> Option<GeoCoordinate> {
    let mut parts = href.split('/').skip(4);
    GeoCoordinate::from_literal(parts.next()?, parts.next()?)
}
