//! Screen coordinates carried in `sub_content` as `"x,y"`.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::kinds::ParseKindError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

fn coordinate_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(-?\d+)\s*,\s*(-?\d+)\s*$").ok())
        .as_ref()
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parses `"x,y"`, tolerating surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        let caps = coordinate_pattern()?.captures(s)?;
        let x = caps.get(1)?.as_str().parse().ok()?;
        let y = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { x, y })
    }
}

impl FromStr for Point {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Point::parse(s).ok_or_else(|| ParseKindError {
            kind: "coordinate",
            value: s.to_string(),
        })
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(Point::parse("10,20"), Some(Point::new(10, 20)));
        assert_eq!(Point::parse(" -5 , 7 "), Some(Point::new(-5, 7)));
        assert_eq!(Point::parse("10;20"), None);
        assert_eq!(Point::parse("hello"), None);
        assert_eq!(Point::parse("99999999999,1"), None);
    }

    #[test]
    fn test_display_round_trips() {
        let p = Point::new(640, -1);
        assert_eq!(p.to_string(), "640,-1");
        assert_eq!(p.to_string().parse::<Point>(), Ok(p));
    }
}
