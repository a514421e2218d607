use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn symbol(&self) -> char {
        match self {
            Self::Full => '★',
            Self::Half => '⯪',
            Self::Empty => '☆',
        }
    }
}

/// A fixed-length sequence of stars describing a normalized score.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rating(Vec<Star>);

impl Rating {
    pub fn stars(&self) -> &[Star] {
        &self.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|star| write!(f, "{}", star.symbol()))
    }
}

/// Converts `score` (out of `max_score`) into `max_stars` full, half and empty stars.
///
/// The score must already lie within `0..=max_score`. Out-of-range input is not corrected here;
/// callers clamp with [`RatingScale::clamp`] first.
///
/// A fractional part below one half produces no half star; the slot it would occupy is filled
/// with an empty star so the result always holds exactly `max_stars` stars.
pub fn rate(score: f64, max_score: f64, max_stars: usize) -> Rating {
    debug_assert!(max_score > 0.0, "max_score must be positive");
    debug_assert!(
        (0.0..=max_score).contains(&score),
        "score {score} is outside of 0..={max_score}"
    );

    let value = star_value(score, max_score, max_stars);
    let full = (value.floor() as usize).min(max_stars);
    let half = full < max_stars && value.fract() >= 0.5;
    let empty = max_stars - full - usize::from(half);

    let mut stars = Vec::with_capacity(max_stars);
    stars.extend(std::iter::repeat(Star::Full).take(full));

    if half {
        stars.push(Star::Half);
    }

    stars.extend(std::iter::repeat(Star::Empty).take(empty));

    Rating(stars)
}

/// The accessible description of a rating: the star value rounded to the nearest half.
pub fn label(score: f64, max_score: f64, max_stars: usize) -> String {
    let rounded = (star_value(score, max_score, max_stars) * 2.0).round() / 2.0;

    format!("{rounded} of {max_stars} stars")
}

fn star_value(score: f64, max_score: f64, max_stars: usize) -> f64 {
    score / max_score * max_stars as f64
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RatingScale {
    #[serde(default = "default_max_score")]
    pub max_score: f64,

    #[serde(default = "default_max_stars")]
    pub max_stars: usize,
}

fn default_max_score() -> f64 {
    RatingScale::default().max_score
}

fn default_max_stars() -> usize {
    RatingScale::default().max_stars
}

impl RatingScale {
    pub fn clamp(&self, score: f64) -> f64 {
        if score.is_nan() {
            return 0.0;
        }

        score.clamp(0.0, self.max_score)
    }

    /// Rates an arbitrary upstream score, clamping it into range first.
    pub fn rate(&self, score: f64) -> Rating {
        rate(self.clamp(score), self.max_score, self.max_stars)
    }

    pub fn label(&self, score: f64) -> String {
        label(self.clamp(score), self.max_score, self.max_stars)
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self {
            max_score: 20.0,
            max_stars: 5,
        }
    }
}
