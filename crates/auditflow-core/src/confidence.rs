use crate::models::{ConfidenceVector, Dimension};

/// Aggregates the five discovery dimensions into one `overall` score.
pub trait ConfidenceScorer: Send + Sync {
    fn aggregate(&self, vector: &ConfidenceVector) -> f64;
}

/// Default aggregation: a fixed weighted mean. Pain carries the most weight
/// because recommendations are built from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedMeanScorer {
    pub information: f64,
    pub resources: f64,
    pub pain: f64,
    pub money: f64,
    pub knowledge: f64,
}

impl Default for WeightedMeanScorer {
    fn default() -> Self {
        Self {
            information: 0.20,
            resources: 0.20,
            pain: 0.25,
            money: 0.20,
            knowledge: 0.15,
        }
    }
}

impl WeightedMeanScorer {
    const fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Information => self.information,
            Dimension::Resources => self.resources,
            Dimension::Pain => self.pain,
            Dimension::Money => self.money,
            Dimension::Knowledge => self.knowledge,
        }
    }
}

impl ConfidenceScorer for WeightedMeanScorer {
    fn aggregate(&self, vector: &ConfidenceVector) -> f64 {
        let total_weight: f64 = Dimension::ALL.iter().map(|d| self.weight(*d)).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = Dimension::ALL
            .iter()
            .map(|d| self.weight(*d) * clamp_unit(vector.get(*d)))
            .sum();
        clamp_unit(weighted / total_weight)
    }
}

#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp every dimension into `[0, 1]` and recompute `overall` locally, so the
/// stored aggregate is a deterministic function of the dimensions whatever an
/// upstream advisor reported.
#[must_use]
pub fn normalize(vector: ConfidenceVector, scorer: &dyn ConfidenceScorer) -> ConfidenceVector {
    let mut normalized = ConfidenceVector::default();
    for dimension in Dimension::ALL {
        normalized.set(dimension, clamp_unit(vector.get(dimension)));
    }
    normalized.overall = scorer.aggregate(&normalized);
    normalized
}

#[must_use]
pub fn weakest_dimension(vector: &ConfidenceVector) -> Dimension {
    Dimension::ALL
        .into_iter()
        .min_by(|a, b| vector.get(*a).total_cmp(&vector.get(*b)))
        .unwrap_or(Dimension::Information)
}
