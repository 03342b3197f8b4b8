use super::properties::{DEFAULT_P1, DEFAULT_P2, DEFAULT_T1, DEFAULT_T2, PropertyType};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MaterialError {
    #[error("Invalid interval [{min}, {max}]")]
    InvalidInterval { min: f64, max: f64 },
    #[error("Correlation '{kind}' expects {expected} coefficient(s), got {actual}")]
    CoefficientCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Correlation for '{property}' overlaps an existing interval (T {t:?}, P {p:?})")]
    OverlappingInterval {
        property: &'static str,
        t: (f64, f64),
        p: (f64, f64),
    },
    #[error("Unknown property key '{0}'")]
    UnknownProperty(String),
    #[error("Property '{property}' cannot be stored on {target}")]
    MisplacedProperty {
        property: &'static str,
        target: &'static str,
    },
}

/// Closed range `[min, max]` of temperature or pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Result<Self, MaterialError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(MaterialError::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn unbounded_above(min: f64) -> Self {
        Self {
            min,
            max: f64::INFINITY,
        }
    }

    pub fn default_temperature() -> Self {
        Self {
            min: DEFAULT_T1,
            max: DEFAULT_T2,
        }
    }

    pub fn default_pressure() -> Self {
        Self {
            min: DEFAULT_P1,
            max: DEFAULT_P2,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// True if the two ranges share a stretch of positive length. Touching ends do not count.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min < other.max && other.min < self.max
    }

    fn as_tuple(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationType {
    Constant,
    Linear,
    #[serde(rename = "exponent_1")]
    Exponent1,
    #[serde(rename = "pow_1")]
    Pow1,
}

impl CorrelationType {
    pub fn name(self) -> &'static str {
        match self {
            CorrelationType::Constant => "Constant",
            CorrelationType::Linear => "Linear",
            CorrelationType::Exponent1 => "Exponential 1",
            CorrelationType::Pow1 => "Power function 1",
        }
    }

    pub fn coefficient_count(self) -> usize {
        match self {
            CorrelationType::Constant => 1,
            CorrelationType::Linear | CorrelationType::Exponent1 => 3,
            CorrelationType::Pow1 => 2,
        }
    }
}

/// Formula of one correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrelationKind {
    /// `y = k0`
    Constant { k0: f64 },
    /// `y = k2*T + k1*P + k0`
    Linear { k0: f64, k1: f64, k2: f64 },
    /// `y = exp(k0 + k1 / (T + k2))`
    Exponent1 { k0: f64, k1: f64, k2: f64 },
    /// `y = k0 * T^k1`
    Pow1 { k0: f64, k1: f64 },
}

impl CorrelationKind {
    pub fn from_coefficients(kind: CorrelationType, k: &[f64]) -> Result<Self, MaterialError> {
        if k.len() != kind.coefficient_count() {
            return Err(MaterialError::CoefficientCount {
                kind: kind.name(),
                expected: kind.coefficient_count(),
                actual: k.len(),
            });
        }
        Ok(match kind {
            CorrelationType::Constant => CorrelationKind::Constant { k0: k[0] },
            CorrelationType::Linear => CorrelationKind::Linear {
                k0: k[0],
                k1: k[1],
                k2: k[2],
            },
            CorrelationType::Exponent1 => CorrelationKind::Exponent1 {
                k0: k[0],
                k1: k[1],
                k2: k[2],
            },
            CorrelationType::Pow1 => CorrelationKind::Pow1 { k0: k[0], k1: k[1] },
        })
    }

    pub fn correlation_type(&self) -> CorrelationType {
        match self {
            CorrelationKind::Constant { .. } => CorrelationType::Constant,
            CorrelationKind::Linear { .. } => CorrelationType::Linear,
            CorrelationKind::Exponent1 { .. } => CorrelationType::Exponent1,
            CorrelationKind::Pow1 { .. } => CorrelationType::Pow1,
        }
    }

    /// Evaluates the formula; any non-finite result is reported as NaN.
    #[inline]
    pub fn evaluate(&self, t: f64, p: f64) -> f64 {
        let value = match *self {
            CorrelationKind::Constant { k0 } => k0,
            CorrelationKind::Linear { k0, k1, k2 } => k2 * t + k1 * p + k0,
            CorrelationKind::Exponent1 { k0, k1, k2 } => {
                let denominator = t + k2;
                if denominator == 0.0 {
                    return f64::NAN;
                }
                (k0 + k1 / denominator).exp()
            }
            CorrelationKind::Pow1 { k0, k1 } => k0 * t.powf(k1),
        };
        if value.is_finite() { value } else { f64::NAN }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub temperature: Interval,
    pub pressure: Interval,
    pub kind: CorrelationKind,
}

impl Correlation {
    pub fn new(temperature: Interval, pressure: Interval, kind: CorrelationKind) -> Self {
        Self {
            temperature,
            pressure,
            kind,
        }
    }

    /// A constant valid for every non-negative temperature and pressure.
    pub fn constant(value: f64) -> Self {
        Self {
            temperature: Interval::unbounded_above(0.0),
            pressure: Interval::unbounded_above(0.0),
            kind: CorrelationKind::Constant { k0: value },
        }
    }

    #[inline]
    pub fn is_in_interval(&self, t: f64, p: f64) -> bool {
        self.temperature.contains(t) && self.pressure.contains(p)
    }

    pub fn overlaps(&self, other: &Correlation) -> bool {
        self.temperature.overlaps(&other.temperature) && self.pressure.overlaps(&other.pressure)
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on T [{}, {}] K, P [{}, {}] Pa",
            self.kind.correlation_type().name(),
            self.temperature.min,
            self.temperature.max,
            self.pressure.min,
            self.pressure.max
        )
    }
}

/// Ordered, non-overlapping set of correlations describing one property.
#[derive(Debug, Clone, PartialEq)]
pub struct TpProperty {
    property: PropertyType,
    correlations: Vec<Correlation>,
}

impl TpProperty {
    pub fn new(property: PropertyType) -> Self {
        Self {
            property,
            correlations: Vec::new(),
        }
    }

    pub fn with_constant(property: PropertyType, value: f64) -> Self {
        Self {
            property,
            correlations: vec![Correlation::constant(value)],
        }
    }

    pub fn property(&self) -> PropertyType {
        self.property
    }

    pub fn correlations(&self) -> &[Correlation] {
        &self.correlations
    }

    pub fn add_correlation(&mut self, correlation: Correlation) -> Result<(), MaterialError> {
        if self.correlations.iter().any(|c| c.overlaps(&correlation)) {
            return Err(MaterialError::OverlappingInterval {
                property: self.property.name(),
                t: correlation.temperature.as_tuple(),
                p: correlation.pressure.as_tuple(),
            });
        }
        let position = self
            .correlations
            .iter()
            .position(|c| {
                (c.temperature.min, c.pressure.min)
                    > (correlation.temperature.min, correlation.pressure.min)
            })
            .unwrap_or(self.correlations.len());
        self.correlations.insert(position, correlation);
        Ok(())
    }

    /// Value at (T, P), or NaN when no interval contains the point.
    #[inline]
    pub fn value(&self, t: f64, p: f64) -> f64 {
        self.correlations
            .iter()
            .find(|c| c.is_in_interval(t, p))
            .map_or(f64::NAN, |c| c.kind.evaluate(t, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE * b.abs().max(1.0)
    }

    fn interval(min: f64, max: f64) -> Interval {
        Interval::new(min, max).unwrap()
    }

    fn constant_on(t: (f64, f64), value: f64) -> Correlation {
        Correlation::new(
            interval(t.0, t.1),
            Interval::default_pressure(),
            CorrelationKind::Constant { k0: value },
        )
    }

    #[test]
    fn interval_rejects_reversed_or_nan_bounds() {
        assert!(Interval::new(2.0, 1.0).is_err());
        assert!(Interval::new(f64::NAN, 1.0).is_err());
        assert!(Interval::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!interval(0.0, 500.0).overlaps(&interval(500.0, 1000.0)));
        assert!(interval(0.0, 500.0).overlaps(&interval(499.0, 1000.0)));
    }

    #[test]
    fn linear_is_affine_in_temperature_and_pressure() {
        let kind = CorrelationKind::Linear {
            k0: 1.0,
            k1: 2.0,
            k2: 3.0,
        };
        assert!(f64_approx_equal(kind.evaluate(10.0, 100.0), 3.0 * 10.0 + 2.0 * 100.0 + 1.0));
    }

    #[test]
    fn exponent_1_matches_formula() {
        let kind = CorrelationKind::Exponent1 {
            k0: 1.0,
            k1: 100.0,
            k2: -50.0,
        };
        let expected = (1.0f64 + 100.0 / (300.0 - 50.0)).exp();
        assert!(f64_approx_equal(kind.evaluate(300.0, 0.0), expected));
    }

    #[test]
    fn exponent_1_with_zero_denominator_is_undefined() {
        let kind = CorrelationKind::Exponent1 {
            k0: 1.0,
            k1: 1.0,
            k2: -300.0,
        };
        assert!(kind.evaluate(300.0, 0.0).is_nan());
    }

    #[test]
    fn pow_1_matches_formula_and_rejects_invalid_bases() {
        let kind = CorrelationKind::Pow1 { k0: 2.0, k1: 0.5 };
        assert!(f64_approx_equal(kind.evaluate(16.0, 0.0), 8.0));
        assert!(kind.evaluate(-4.0, 0.0).is_nan());
        let inverse = CorrelationKind::Pow1 { k0: 1.0, k1: -1.0 };
        assert!(inverse.evaluate(0.0, 0.0).is_nan());
    }

    #[test]
    fn coefficient_count_is_checked() {
        let result = CorrelationKind::from_coefficients(CorrelationType::Linear, &[1.0]);
        assert!(matches!(
            result,
            Err(MaterialError::CoefficientCount {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn value_outside_every_interval_is_undefined() {
        let mut property = TpProperty::new(PropertyType::Density);
        property.add_correlation(constant_on((0.0, 500.0), 1.0)).unwrap();
        property
            .add_correlation(constant_on((600.0, 800.0), 2.0))
            .unwrap();

        for t in [-1.0, 550.0, 800.5, 1e6] {
            assert!(property.value(t, 1000.0).is_nan(), "T = {t}");
        }
        assert!(property.value(100.0, 2e6).is_nan());
        assert!(property.value(f64::NAN, 1000.0).is_nan());
    }

    #[test]
    fn constant_is_invariant_inside_its_interval() {
        let property = TpProperty::with_constant(PropertyType::YoungModulus, 2.1e11);
        for (t, p) in [(0.0, 0.0), (273.15, 101_325.0), (1500.0, 5e7)] {
            assert_eq!(property.value(t, p), 2.1e11);
        }
    }

    #[test]
    fn lookup_selects_the_matching_interval() {
        let mut property = TpProperty::new(PropertyType::HeatCapacity);
        property
            .add_correlation(constant_on((500.0, 1000.0), 2.0))
            .unwrap();
        property.add_correlation(constant_on((0.0, 500.0), 1.0)).unwrap();

        assert_eq!(property.correlations()[0].temperature.min(), 0.0);
        assert_eq!(property.value(250.0, 0.0), 1.0);
        assert_eq!(property.value(750.0, 0.0), 2.0);
        // Shared boundary resolves to the first interval in order.
        assert_eq!(property.value(500.0, 0.0), 1.0);
    }

    #[test]
    fn overlapping_correlation_is_rejected() {
        let mut property = TpProperty::new(PropertyType::Density);
        property.add_correlation(constant_on((0.0, 500.0), 1.0)).unwrap();
        let result = property.add_correlation(constant_on((400.0, 600.0), 2.0));
        assert!(matches!(
            result,
            Err(MaterialError::OverlappingInterval { .. })
        ));
        assert_eq!(property.correlations().len(), 1);
    }

    #[test]
    fn disjoint_pressure_ranges_may_share_temperatures() {
        let mut property = TpProperty::new(PropertyType::Density);
        let low = Correlation::new(
            interval(0.0, 500.0),
            interval(0.0, 1e5),
            CorrelationKind::Constant { k0: 1.0 },
        );
        let high = Correlation::new(
            interval(0.0, 500.0),
            interval(1e5, 1e6),
            CorrelationKind::Constant { k0: 2.0 },
        );
        property.add_correlation(low).unwrap();
        property.add_correlation(high).unwrap();
        assert_eq!(property.value(300.0, 5e5), 2.0);
    }
}
