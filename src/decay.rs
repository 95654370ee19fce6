use strum::{Display, EnumString};

use crate::error::{Error, Result};

/// A hyperparameter that changes with time, `t` counted in trials
pub trait Decay {
    /// Value at time `t`
    fn evaluate(&self, t: f64) -> f64;

    /// The value the schedule settles at as `t` grows
    fn limit(&self) -> f64;
}

/// A value that never changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f64) -> f64 {
        self.value
    }

    fn limit(&self) -> f64 {
        self.value
    }
}

/// How an [`Anneal`] schedule closes the gap between its start and end values
#[derive(Display, EnumString, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum Shape {
    /// gap(t) = gap(0) · e<sup>-rt</sup>
    Exponential,
    /// gap(t) = gap(0) / (1 + rt)
    InverseTime,
    /// gap(t) = max(gap(0) - rt, 0)
    Linear,
}

/// A value falling from `start` toward `end` at `rate`, never going below `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anneal {
    shape: Shape,
    rate: f64,
    start: f64,
    end: f64,
}

impl Anneal {
    /// **Errors** with [`Error::Decay`] if `rate` is negative or `start` lies below `end`
    pub fn new(shape: Shape, rate: f64, start: f64, end: f64) -> Result<Self> {
        if !(rate >= 0.0 && rate.is_finite()) {
            return Err(Error::Decay(format!(
                "rate must be finite and non-negative, got {rate}"
            )));
        }
        if !(start >= end) {
            return Err(Error::Decay(format!(
                "start ({start}) must not lie below end ({end})"
            )));
        }
        Ok(Self {
            shape,
            rate,
            start,
            end,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }
}

impl Decay for Anneal {
    fn evaluate(&self, t: f64) -> f64 {
        let gap = self.start - self.end;
        let rt = self.rate * t;
        let remaining = match self.shape {
            Shape::Exponential => gap * (-rt).exp(),
            Shape::InverseTime => gap / (1.0 + rt),
            Shape::Linear => (gap - rt).max(0.0),
        };
        self.end + remaining
    }

    fn limit(&self) -> f64 {
        self.end
    }
}
