//! Reconstruction losses.

use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::NeuralKinError;

/// Reconstruction loss selector, as named in the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossType {
    /// Mean squared error.
    Mse,
    /// Mean absolute error.
    L1,
    /// Binary cross-entropy over `[0, 1]` pixels.
    Bce,
}

impl std::str::FromStr for LossType {
    type Err = NeuralKinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mse" => Ok(LossType::Mse),
            "l1" => Ok(LossType::L1),
            "bce" => Ok(LossType::Bce),
            _ => Err(NeuralKinError::InvalidConfig {
                message: format!("unknown loss type '{}'", s),
            }),
        }
    }
}

/// Mean-reduced reconstruction loss over frames.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionLoss {
    kind: LossType,
}

impl ReconstructionLoss {
    /// Create a loss of the given kind.
    pub fn new(kind: LossType) -> Self {
        Self { kind }
    }

    /// The configured loss kind.
    pub fn kind(&self) -> LossType {
        self.kind
    }

    /// Compute the scalar loss between a prediction and its target.
    pub fn forward<B: Backend>(
        &self,
        prediction: Tensor<B, 4>,
        target: Tensor<B, 4>,
    ) -> Tensor<B, 1> {
        match self.kind {
            LossType::Mse => MseLoss::new().forward(prediction, target, Reduction::Mean),
            LossType::L1 => (prediction - target).abs().mean(),
            LossType::Bce => {
                // Clamp away from {0, 1} so the logs stay finite.
                let eps = 1e-6;
                let p = prediction.clamp(eps, 1.0 - eps);
                let ones = Tensor::ones(target.dims(), &target.device());
                let loss = target.clone() * p.clone().log()
                    + (ones.clone() - target) * (ones - p).log();
                loss.mean().neg()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_data().to_vec().unwrap()[0]
    }

    #[test]
    fn test_loss_type_parsing() {
        assert_eq!("mse".parse::<LossType>().unwrap(), LossType::Mse);
        assert_eq!("l1".parse::<LossType>().unwrap(), LossType::L1);
        assert_eq!("bce".parse::<LossType>().unwrap(), LossType::Bce);
        assert!("hinge".parse::<LossType>().is_err());
    }

    #[test]
    fn test_perfect_prediction_has_low_loss() {
        let device = Default::default();
        let target = Tensor::<TestBackend, 4>::full([1, 1, 4, 4], 0.5, &device);

        for kind in [LossType::Mse, LossType::L1] {
            let loss = ReconstructionLoss::new(kind).forward(target.clone(), target.clone());
            assert!(scalar(loss).abs() < 1e-6);
        }

        // BCE of a perfect 0.5 prediction is ln(2), not zero.
        let loss = ReconstructionLoss::new(LossType::Bce).forward(target.clone(), target);
        assert!((scalar(loss) - std::f32::consts::LN_2).abs() < 1e-4);
    }

    #[test]
    fn test_mse_known_value() {
        let device = Default::default();
        let prediction = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 1.0, &device);
        let target = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 0.0, &device);

        let loss = ReconstructionLoss::new(LossType::Mse).forward(prediction, target);
        assert!((scalar(loss) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l1_known_value() {
        let device = Default::default();
        let prediction = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 0.75, &device);
        let target = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 0.25, &device);

        let loss = ReconstructionLoss::new(LossType::L1).forward(prediction, target);
        assert!((scalar(loss) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bce_penalizes_confident_mistakes() {
        let device = Default::default();
        let confident_wrong = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 0.99, &device);
        let hedged = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 0.6, &device);
        let target = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device);

        let loss_fn = ReconstructionLoss::new(LossType::Bce);
        let wrong = scalar(loss_fn.forward(confident_wrong, target.clone()));
        let meh = scalar(loss_fn.forward(hedged, target));
        assert!(wrong > meh);
    }
}
