//! SVG path geometry for edge hit testing.
//!
//! Supports the subset that graph renderers emit for edges: move, line,
//! horizontal/vertical line, cubic bezier and close, in absolute and
//! relative forms. Distances to cubic segments are measured by sampling the
//! curve into line segments.

use crate::error::{Error, Result};
use lockview_transform::Point;

/// Number of line segments a cubic is split into when measuring distance.
const CUBIC_SAMPLES: usize = 20;

/// One drawable piece of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// A straight line.
    Line(Point, Point),
    /// A cubic bezier: start, two control points, end.
    Cubic(Point, Point, Point, Point),
}

impl Segment {
    /// Shortest distance from `point` to this segment.
    #[must_use]
    pub fn distance_to(&self, point: Point) -> f64 {
        match *self {
            Self::Line(a, b) => distance_to_line_segment_sq(point, a, b).sqrt(),
            Self::Cubic(p0, p1, p2, p3) => {
                let mut min_dist_sq = f64::MAX;
                let mut prev = p0;
                for i in 1..=CUBIC_SAMPLES {
                    #[allow(clippy::cast_precision_loss)]
                    let t = i as f64 / CUBIC_SAMPLES as f64;
                    let curr = eval_cubic(p0, p1, p2, p3, t);
                    min_dist_sq = min_dist_sq.min(distance_to_line_segment_sq(point, prev, curr));
                    prev = curr;
                }
                min_dist_sq.sqrt()
            }
        }
    }
}

/// Parsed path geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGeometry {
    segments: Vec<Segment>,
}

impl PathGeometry {
    /// Parse SVG path data.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedBody` for unsupported commands, missing
    /// coordinates, or data that does not start with a move.
    pub fn parse(data: &str) -> Result<Self> {
        let mut cursor = Cursor {
            data,
            tokens: tokenize(data)?,
            pos: 0,
        };
        let mut segments = Vec::new();
        let mut current = Point::ORIGIN;
        let mut subpath_start = Point::ORIGIN;
        let mut command: Option<char> = None;

        while let Some(token) = cursor.tokens.get(cursor.pos).copied() {
            let cmd = match token {
                Token::Command(c) => {
                    cursor.pos += 1;
                    c
                }
                // Implicit repetition of the previous command; a repeated
                // moveto becomes a lineto.
                Token::Number(_) => match command {
                    Some('M') => 'L',
                    Some('m') => 'l',
                    Some(c) if !matches!(c, 'Z' | 'z') => c,
                    _ => return Err(malformed(data, "coordinates without a command")),
                },
            };
            if command.is_none() && !matches!(cmd, 'M' | 'm') {
                return Err(malformed(data, "path must start with a move"));
            }
            command = Some(cmd);

            let base = if cmd.is_ascii_lowercase() {
                current
            } else {
                Point::ORIGIN
            };

            match cmd.to_ascii_uppercase() {
                'M' => {
                    current = cursor.point(base)?;
                    subpath_start = current;
                }
                'L' => {
                    let to = cursor.point(base)?;
                    segments.push(Segment::Line(current, to));
                    current = to;
                }
                'H' => {
                    let to = Point::new(cursor.number("x")? + base.x, current.y);
                    segments.push(Segment::Line(current, to));
                    current = to;
                }
                'V' => {
                    let to = Point::new(current.x, cursor.number("y")? + base.y);
                    segments.push(Segment::Line(current, to));
                    current = to;
                }
                'C' => {
                    let c1 = cursor.point(base)?;
                    let c2 = cursor.point(base)?;
                    let to = cursor.point(base)?;
                    segments.push(Segment::Cubic(current, c1, c2, to));
                    current = to;
                }
                'Z' => {
                    if current != subpath_start {
                        segments.push(Segment::Line(current, subpath_start));
                    }
                    current = subpath_start;
                }
                other => {
                    return Err(malformed(data, &format!("unsupported command '{other}'")));
                }
            }
        }

        Ok(Self { segments })
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Shortest distance from `point` to the path, or `None` if the path has
    /// no drawable segments.
    #[must_use]
    pub fn distance_to(&self, point: Point) -> Option<f64> {
        self.segments
            .iter()
            .map(|segment| segment.distance_to(point))
            .reduce(f64::min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(data: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = data.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(Token::Command(c));
            i += 1;
        } else {
            let start = i;
            let mut seen_dot = false;
            if chars[i] == '-' || chars[i] == '+' {
                i += 1;
            }
            while i < chars.len() {
                let d = chars[i];
                if d.is_ascii_digit() {
                    i += 1;
                } else if d == '.' && !seen_dot {
                    seen_dot = true;
                    i += 1;
                } else if (d == 'e' || d == 'E') && i > start {
                    i += 1;
                    if i < chars.len() && (chars[i] == '-' || chars[i] == '+') {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| malformed(data, &format!("bad number '{text}'")))?;
            tokens.push(Token::Number(value));
        }
    }
    Ok(tokens)
}

struct Cursor<'a> {
    data: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor<'_> {
    fn number(&mut self, what: &str) -> Result<f64> {
        match self.tokens.get(self.pos) {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(*n)
            }
            _ => Err(malformed(self.data, &format!("missing {what}"))),
        }
    }

    fn point(&mut self, base: Point) -> Result<Point> {
        let x = self.number("x")?;
        let y = self.number("y")?;
        Ok(Point::new(x, y).plus(base))
    }
}

fn malformed(data: &str, reason: &str) -> Error {
    Error::MalformedBody(format!("path data {data:?}: {reason}"))
}

fn eval_cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

fn distance_to_line_segment_sq(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.minus(a);
    let ap = p.minus(a);
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return ap.x * ap.x + ap.y * ap.y;
    }
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * ab.x, a.y + t * ab.y);
    let d = p.minus(closest);
    d.x * d.x + d.y * d.y
}
