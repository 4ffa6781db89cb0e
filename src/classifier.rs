//! Ride-compatibility classifier
//!
//! A small binary logistic regression fit once at construction from a fixed
//! labeled feature table. The solver is deterministic full-batch gradient
//! descent from a zero initialization, so the decision boundary is identical
//! across restarts. There is no retraining trigger; the model is read-only
//! for the life of the process.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Feature vector for one candidate pairing, computed per match attempt
///
/// Ephemeral: never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Great-circle distance between the two origins, km (>= 0)
    pub distance_km: f64,
    /// Absolute difference of reservation times, minutes (>= 0)
    pub time_diff_minutes: i64,
    /// Case-sensitive equality of the payment method strings
    pub payment_matches: bool,
}

impl FeatureVector {
    fn as_inputs(&self) -> [f64; 3] {
        [
            self.distance_km,
            self.time_diff_minutes as f64,
            if self.payment_matches { 1.0 } else { 0.0 },
        ]
    }
}

/// Fixed training table: (distance km, time diff minutes, payment match) -> compatible
const TRAINING_SET: &[([f64; 3], f64)] = &[
    ([5.0, 10.0, 1.0], 1.0),
    ([2.0, 5.0, 0.0], 0.0),
    ([1.0, 2.0, 1.0], 1.0),
    ([10.0, 30.0, 0.0], 0.0),
];

const LEARNING_RATE: f64 = 0.01;
const EPOCHS: usize = 10_000;

/// Logistic-regression compatibility classifier
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityClassifier {
    weights: [f64; 3],
    bias: f64,
}

impl CompatibilityClassifier {
    /// Fit the classifier from the fixed training table
    ///
    /// Full-batch gradient descent on the logistic loss; zero init, fixed
    /// learning rate and epoch count, no randomness anywhere.
    pub fn train() -> Self {
        let mut weights = [0.0f64; 3];
        let mut bias = 0.0f64;
        let n = TRAINING_SET.len() as f64;

        for _ in 0..EPOCHS {
            let mut grad_w = [0.0f64; 3];
            let mut grad_b = 0.0f64;

            for (inputs, label) in TRAINING_SET {
                let z = bias
                    + weights
                        .iter()
                        .zip(inputs.iter())
                        .map(|(w, x)| w * x)
                        .sum::<f64>();
                let residual = sigmoid(z) - label;
                for (g, x) in grad_w.iter_mut().zip(inputs.iter()) {
                    *g += residual * x;
                }
                grad_b += residual;
            }

            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= LEARNING_RATE * g / n;
            }
            bias -= LEARNING_RATE * grad_b / n;
        }

        info!(
            w_distance = weights[0],
            w_time = weights[1],
            w_payment = weights[2],
            bias,
            "Compatibility classifier trained"
        );

        Self { weights, bias }
    }

    /// Predict whether a candidate pairing is compatible
    pub fn predict(&self, features: &FeatureVector) -> bool {
        self.score(features) >= 0.0
    }

    /// Linear score before the sigmoid; positive means compatible
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let inputs = features.as_inputs();
        self.bias
            + self
                .weights
                .iter()
                .zip(inputs.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
