//! Track geometry: sampling a function into a curve and mapping it to screen
//!
//! The track is sampled once per session and never mutated afterwards.
//! A car position is a fractional sample index in `[0, len - 1]`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::expr::{Expr, ExprError};
use crate::lerp;

/// Validated x-range the function is sampled over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    xmin: f64,
    xmax: f64,
}

impl Domain {
    pub fn new(xmin: f64, xmax: f64) -> Result<Self, ConfigError> {
        for (which, value) in [("xmin", xmin), ("xmax", xmax)] {
            if !value.is_finite() {
                return Err(ConfigError::BoundNotFinite { which, value });
            }
            if value.abs() > MAX_DOMAIN_MAGNITUDE {
                return Err(ConfigError::BoundTooLarge {
                    which,
                    value,
                    limit: MAX_DOMAIN_MAGNITUDE,
                });
            }
        }
        if xmin >= xmax {
            return Err(ConfigError::EmptyDomain { xmin, xmax });
        }
        if xmax - xmin < MIN_DOMAIN_WIDTH {
            return Err(ConfigError::DomainTooNarrow {
                xmin,
                xmax,
                min_width: MIN_DOMAIN_WIDTH,
            });
        }
        Ok(Self { xmin, xmax })
    }

    /// Parse bounds typed by the player
    pub fn parse(xmin: &str, xmax: &str) -> Result<Self, ConfigError> {
        let parse_bound = |which: &'static str, text: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::BoundNotNumeric {
                    which,
                    value: text.to_string(),
                })
        };
        Self::new(parse_bound("xmin", xmin)?, parse_bound("xmax", xmax)?)
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// `n` evenly spaced x values from xmin to xmax inclusive
    pub fn linspace(&self, n: usize) -> impl Iterator<Item = f64> + '_ {
        let last = n.saturating_sub(1);
        let step = if last == 0 { 0.0 } else { self.width() / last as f64 };
        (0..n).map(move |i| {
            if i == last {
                self.xmax
            } else {
                self.xmin + step * i as f64
            }
        })
    }
}

/// A sampled world-space point on the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

/// Pixel rectangle the track is drawn into (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Sample `src` over the domain, failing on parse errors or any undefined point
pub fn try_sample(src: &str, domain: &Domain, n: usize) -> Result<Vec<TrackPoint>, ExprError> {
    let expr = Expr::parse(src)?;
    domain
        .linspace(n)
        .map(|x| -> Result<TrackPoint, ExprError> {
            Ok(TrackPoint {
                x,
                y: expr.eval_finite(x)?,
            })
        })
        .collect()
}

/// The sampled curve the car rides on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    points: Vec<TrackPoint>,
    domain: Domain,
    ymin: f64,
    ymax: f64,
    /// Expression the points were actually sampled from
    expression: String,
    /// True when the player's expression was replaced by the default
    fallback: bool,
}

impl Track {
    /// Sample the player's expression, substituting the default on failure
    ///
    /// `n` is raised to 2 so the track always has a start and a finish.
    pub fn from_expression(src: &str, domain: Domain, n: usize) -> Self {
        let n = n.max(2);
        match try_sample(src, &domain, n) {
            Ok(points) => Self::from_points(points, domain, src.trim().to_string(), false),
            Err(e) => {
                log::warn!(
                    "Track function {:?} rejected ({}), using {}",
                    src,
                    e,
                    DEFAULT_EXPRESSION
                );
                // The default is finite everywhere inside MAX_DOMAIN_MAGNITUDE
                let points = try_sample(DEFAULT_EXPRESSION, &domain, n).unwrap_or_else(|e| {
                    log::error!("Default track function failed ({}), using a flat track", e);
                    domain.linspace(n).map(|x| TrackPoint { x, y: 0.0 }).collect()
                });
                Self::from_points(points, domain, DEFAULT_EXPRESSION.to_string(), true)
            }
        }
    }

    fn from_points(points: Vec<TrackPoint>, domain: Domain, expression: String, fallback: bool) -> Self {
        let (ymin, ymax) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        Self {
            points,
            domain,
            ymin,
            ymax,
            expression,
            fallback,
        }
    }

    #[inline]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// (ymin, ymax) over the sampled points
    #[inline]
    pub fn y_bounds(&self) -> (f64, f64) {
        (self.ymin, self.ymax)
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Last valid car position (the finish line)
    #[inline]
    pub fn end_position(&self) -> f64 {
        self.points.len().saturating_sub(1) as f64
    }

    /// World point at a fractional index, interpolated between neighbours
    pub fn point_at(&self, index: f64) -> TrackPoint {
        let Some(last) = self.points.last() else {
            return TrackPoint { x: 0.0, y: 0.0 };
        };
        let index = index.clamp(0.0, self.end_position());
        let i = index.floor() as usize;
        if i + 1 >= self.points.len() {
            return *last;
        }
        let (a, b) = (self.points[i], self.points[i + 1]);
        let t = index - i as f64;
        TrackPoint {
            x: lerp(a.x, b.x, t),
            y: lerp(a.y, b.y, t),
        }
    }

    /// Project a world point into `rect`, leaving `margin` pixels on each side
    ///
    /// The margin shrinks to at most a quarter of each side, so small
    /// rectangles still map left to right and bottom to top.
    pub fn project(&self, point: TrackPoint, rect: &ScreenRect, margin: f32) -> Vec2 {
        let tx = (point.x - self.domain.xmin) / self.domain.width();
        let y_span = self.ymax - self.ymin;
        // Flat track: draw along the vertical centre
        let ty = if y_span > 0.0 {
            (point.y - self.ymin) / y_span
        } else {
            0.5
        };
        let fit = |extent: f32| margin.max(0.0).min(extent.max(0.0) / 4.0);
        let (mx, my) = (fit(rect.width), fit(rect.height));
        let inner_w = (rect.width - 2.0 * mx).max(0.0);
        let inner_h = (rect.height - 2.0 * my).max(0.0);
        Vec2::new(
            rect.left() + mx + tx as f32 * inner_w,
            rect.bottom() - my - ty as f32 * inner_h,
        )
    }

    /// Screen position of a fractional track index
    pub fn world_to_screen(&self, index: f64, rect: &ScreenRect, margin: f32) -> Vec2 {
        self.project(self.point_at(index), rect, margin)
    }

    /// Every sample projected into `rect`, ready to draw as a polyline
    pub fn screen_points(&self, rect: &ScreenRect, margin: f32) -> Vec<Vec2> {
        self.points
            .iter()
            .map(|p| self.project(*p, rect, margin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_domain() -> Domain {
        Domain::new(0.0, 10.0).unwrap()
    }

    fn rect() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 1024.0, 500.0)
    }

    #[test]
    fn test_domain_rejects_bad_bounds() {
        assert!(matches!(
            Domain::new(5.0, 5.0),
            Err(ConfigError::EmptyDomain { .. })
        ));
        assert!(matches!(
            Domain::new(10.0, 0.0),
            Err(ConfigError::EmptyDomain { .. })
        ));
        assert!(matches!(
            Domain::new(f64::NAN, 1.0),
            Err(ConfigError::BoundNotFinite { which: "xmin", .. })
        ));
        assert!(matches!(
            Domain::new(0.0, 1.0e9),
            Err(ConfigError::BoundTooLarge { which: "xmax", .. })
        ));
        assert!(matches!(
            Domain::new(0.0, 1.0e-6),
            Err(ConfigError::DomainTooNarrow { .. })
        ));
    }

    #[test]
    fn test_domain_parse() {
        let domain = Domain::parse(" -2.5", "4").unwrap();
        assert_eq!(domain.xmin(), -2.5);
        assert_eq!(domain.xmax(), 4.0);
        assert!(matches!(
            Domain::parse("abc", "4"),
            Err(ConfigError::BoundNotNumeric { which: "xmin", .. })
        ));
        assert!(Domain::parse("1", "").is_err());
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs: Vec<f64> = unit_domain().linspace(11).collect();
        assert_eq!(xs.len(), 11);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[5], 5.0);
        assert_eq!(xs[10], 10.0);
    }

    #[test]
    fn test_sample_player_expression() {
        let track = Track::from_expression("x + 1", unit_domain(), SAMPLE_COUNT);
        assert!(!track.is_fallback());
        assert_eq!(track.len(), SAMPLE_COUNT);
        assert_eq!(track.expression(), "x + 1");
        assert_eq!(track.y_bounds(), (1.0, 11.0));
        assert_eq!(track.points()[0], TrackPoint { x: 0.0, y: 1.0 });
    }

    #[test]
    fn test_parse_failure_falls_back_to_default() {
        let track = Track::from_expression("x +* 2", unit_domain(), 100);
        assert!(track.is_fallback());
        assert_eq!(track.expression(), DEFAULT_EXPRESSION);
        assert_eq!(track.points()[0].y, 10.0);
        assert_eq!(track.points()[99].y, -90.0);
    }

    #[test]
    fn test_undefined_point_falls_back_to_default() {
        // 1/x is undefined at the first sample
        let track = Track::from_expression("1/x", unit_domain(), 100);
        assert!(track.is_fallback());
        let expected = try_sample(DEFAULT_EXPRESSION, &unit_domain(), 100).unwrap();
        assert_eq!(track.points(), expected.as_slice());
        for p in track.points() {
            assert!((p.y - (10.0 - p.x * p.x)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deeply_nested_expression_falls_back() {
        let depth = 10_000;
        let src = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let track = Track::from_expression(&src, unit_domain(), 10);
        assert!(track.is_fallback());
        assert_eq!(track.len(), 10);

        let signs = format!("{}x", "-".repeat(depth));
        assert!(Track::from_expression(&signs, unit_domain(), 10).is_fallback());

        // Short enough to tokenize, too deep to parse
        let short = format!("{}x{}", "(".repeat(300), ")".repeat(300));
        assert!(Track::from_expression(&short, unit_domain(), 10).is_fallback());
    }

    #[test]
    fn test_too_few_samples_raised_to_two() {
        for n in [0, 1] {
            let track = Track::from_expression("x", unit_domain(), n);
            assert_eq!(track.len(), 2);
            assert_eq!(track.y_bounds(), (0.0, 10.0));
            let p = track.world_to_screen(0.0, &rect(), TRACK_MARGIN);
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn test_small_rect_keeps_orientation() {
        let track = Track::from_expression("x", unit_domain(), 100);
        let small = ScreenRect::new(0.0, 0.0, 60.0, 60.0);
        let start = track.world_to_screen(0.0, &small, 40.0);
        let end = track.world_to_screen(track.end_position(), &small, 40.0);
        assert!(start.x < end.x);
        assert!(start.y > end.y);
        assert_eq!(start, Vec2::new(15.0, 45.0));
        assert_eq!(end, Vec2::new(45.0, 15.0));

        // Zero-sized rect collapses to a point instead of flipping
        let empty = ScreenRect::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(track.world_to_screen(0.0, &empty, 40.0), Vec2::new(5.0, 5.0));
        assert_eq!(track.world_to_screen(99.0, &empty, 40.0), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_try_sample_reports_error() {
        assert!(matches!(
            try_sample("ln(x - 5)", &unit_domain(), 10),
            Err(ExprError::Eval(_))
        ));
        assert!(matches!(
            try_sample("foo(x)", &unit_domain(), 10),
            Err(ExprError::Parse(_))
        ));
    }

    #[test]
    fn test_point_at_interpolates() {
        let track = Track::from_expression("2*x", unit_domain(), 11);
        assert_eq!(track.point_at(3.0), TrackPoint { x: 3.0, y: 6.0 });
        let mid = track.point_at(3.5);
        assert!((mid.x - 3.5).abs() < 1e-12);
        assert!((mid.y - 7.0).abs() < 1e-12);
        // Clamped at both ends
        assert_eq!(track.point_at(-4.0), track.points()[0]);
        assert_eq!(track.point_at(50.0), track.points()[10]);
    }

    #[test]
    fn test_world_to_screen_extremes() {
        let track = Track::from_expression("x + 1", unit_domain(), SAMPLE_COUNT);
        let r = rect();
        let start = track.world_to_screen(0.0, &r, TRACK_MARGIN);
        let end = track.world_to_screen(track.end_position(), &r, TRACK_MARGIN);
        assert_eq!(start, Vec2::new(40.0, 460.0));
        assert_eq!(end, Vec2::new(984.0, 40.0));
    }

    #[test]
    fn test_flat_track_is_centred() {
        let track = Track::from_expression("5", unit_domain(), 10);
        let p = track.world_to_screen(4.0, &rect(), TRACK_MARGIN);
        assert_eq!(p.y, 250.0);
    }

    #[test]
    fn test_screen_points_offset_by_rect_origin() {
        let track = Track::from_expression("x", unit_domain(), 2);
        let points = track.screen_points(&ScreenRect::new(100.0, 50.0, 200.0, 100.0), 10.0);
        assert_eq!(points, vec![Vec2::new(110.0, 140.0), Vec2::new(290.0, 60.0)]);
    }

    proptest! {
        #[test]
        fn prop_samples_strictly_increasing(
            xmin in -1000.0f64..1000.0,
            width in 0.01f64..1000.0,
            n in 2usize..2000,
        ) {
            let domain = Domain::new(xmin, xmin + width).unwrap();
            let track = Track::from_expression("sin(x) * x", domain, n);
            prop_assert_eq!(track.len(), n);
            for pair in track.points().windows(2) {
                prop_assert!(pair[0].x < pair[1].x);
            }
        }

        #[test]
        fn prop_default_expression_defined_on_any_domain(
            xmin in -MAX_DOMAIN_MAGNITUDE..MAX_DOMAIN_MAGNITUDE,
            width in MIN_DOMAIN_WIDTH..1000.0,
        ) {
            let xmax = (xmin + width).min(MAX_DOMAIN_MAGNITUDE);
            prop_assume!(xmax - xmin >= MIN_DOMAIN_WIDTH);
            let domain = Domain::new(xmin, xmax).unwrap();
            prop_assert!(try_sample(DEFAULT_EXPRESSION, &domain, 50).is_ok());
        }

        #[test]
        fn prop_small_rects_stay_monotonic(
            width in 1.0f32..200.0,
            height in 1.0f32..200.0,
            margin in 0.0f32..200.0,
        ) {
            let track = Track::from_expression("x", Domain::new(0.0, 10.0).unwrap(), 50);
            let r = ScreenRect::new(0.0, 0.0, width, height);
            let start = track.world_to_screen(0.0, &r, margin);
            let end = track.world_to_screen(track.end_position(), &r, margin);
            prop_assert!(start.x < end.x);
            prop_assert!(start.x >= 0.0 && end.x <= width);
        }

        #[test]
        fn prop_world_to_screen_monotonic(a in 0.0f64..999.0, b in 0.0f64..999.0) {
            let track = Track::from_expression("cos(x) * 3", Domain::new(-5.0, 5.0).unwrap(), SAMPLE_COUNT);
            let r = rect();
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assume!(hi - lo > 1e-3);
            let sx_lo = track.world_to_screen(lo, &r, TRACK_MARGIN).x;
            let sx_hi = track.world_to_screen(hi, &r, TRACK_MARGIN).x;
            prop_assert!(sx_lo < sx_hi);
            prop_assert!(sx_lo >= TRACK_MARGIN && sx_hi <= r.width - TRACK_MARGIN);
        }
    }
}
