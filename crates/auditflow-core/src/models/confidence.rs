use serde::{Deserialize, Serialize};

/// Discovery axis tracked by the confidence vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Information about the business and how it runs today.
    #[serde(rename = "I")]
    Information,
    /// Resources: team, tools and systems in place.
    #[serde(rename = "R")]
    Resources,
    /// Pain: where time or money is being lost.
    #[serde(rename = "P")]
    Pain,
    /// Money: budget and expected value of fixing the pain.
    #[serde(rename = "M")]
    Money,
    /// Knowledge: technical familiarity and readiness to adopt automation.
    #[serde(rename = "K")]
    Knowledge,
}

impl Dimension {
    pub const ALL: [Self; 5] = [
        Self::Information,
        Self::Resources,
        Self::Pain,
        Self::Money,
        Self::Knowledge,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Information => "I",
            Self::Resources => "R",
            Self::Pain => "P",
            Self::Money => "M",
            Self::Knowledge => "K",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceVector {
    #[serde(rename = "I", default)]
    pub i: f64,
    #[serde(rename = "R", default)]
    pub r: f64,
    #[serde(rename = "P", default)]
    pub p: f64,
    #[serde(rename = "M", default)]
    pub m: f64,
    #[serde(rename = "K", default)]
    pub k: f64,
    #[serde(default)]
    pub overall: f64,
}

impl ConfidenceVector {
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Information => self.i,
            Dimension::Resources => self.r,
            Dimension::Pain => self.p,
            Dimension::Money => self.m,
            Dimension::Knowledge => self.k,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Information => self.i = value,
            Dimension::Resources => self.r = value,
            Dimension::Pain => self.p = value,
            Dimension::Money => self.m = value,
            Dimension::Knowledge => self.k = value,
        }
    }
}
