//! Classifier feature encoding.

use serde::{Deserialize, Serialize};

use crate::landmark::Hand;

/// Flat, translation-invariant encoding of one hand.
///
/// Layout is `[x0, y0, x1, y1, ...]` with each axis shifted so that its
/// minimum is zero. The classifier was fit on exactly this layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Encode a hand as a feature vector.
///
/// `out[2i] = x_i - min(x)` and `out[2i + 1] = y_i - min(y)`, in landmark
/// order. An empty hand yields an empty vector.
pub fn normalize(hand: &Hand) -> FeatureVector {
    let (min_x, min_y) = hand
        .landmarks
        .iter()
        .fold((f32::INFINITY, f32::INFINITY), |(mx, my), lm| {
            (mx.min(lm.x), my.min(lm.y))
        });

    let mut out = Vec::with_capacity(hand.len() * 2);
    for lm in &hand.landmarks {
        out.push(lm.x - min_x);
        out.push(lm.y - min_y);
    }
    FeatureVector(out)
}
