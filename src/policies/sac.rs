use std::path::Path;

use tch::nn::{self, Module};
use tch::{Device, Tensor};

use crate::error::{Error, Result};
use crate::networks::mlp::MLP;
use crate::policy::Policy;
use crate::spaces::Space;
use crate::utils::ToTensor;

const LOG_STD_MIN: f64 = -20.0;
const LOG_STD_MAX: f64 = 2.0;

/// Squashed-Gaussian SAC actor: `tanh(mu + std * eps)`, rescaled from
/// `[-1, 1]` to the bounds of a flat Box action space.
pub struct SacPolicy {
    latent: MLP,
    mu: nn::Linear,
    log_std: nn::Linear,
    obs_dim: usize,
    low: Vec<f32>,
    high: Vec<f32>,
}

impl SacPolicy {
    /// Randomly initialised actor.
    pub fn new(device: Device, obs_dim: usize, action_space: &Space, hidden: &[i64]) -> Result<Self> {
        let Space::Box { low, high, .. } = action_space else {
            return Err(Error::OutOfSpace("SAC needs a flat box action space".into()));
        };
        let act_dim = low.len() as i64;

        let latent = MLP::new(nn::VarStore::new(device), obs_dim as i64, hidden);
        let (mu, log_std) = {
            let root = latent.var_store().root();
            let width = latent.output_dim();
            (
                nn::linear(&root / "mu", width, act_dim, Default::default()),
                nn::linear(&root / "log_std", width, act_dim, Default::default()),
            )
        };

        Ok(SacPolicy {
            latent,
            mu,
            log_std,
            obs_dim,
            low: low.clone(),
            high: high.clone(),
        })
    }

    /// Actor with weights read from `path` (`.safetensors`, `.ot` or `.npz`).
    pub fn load(
        path: impl AsRef<Path>,
        device: Device,
        obs_dim: usize,
        action_space: &Space,
        hidden: &[i64],
    ) -> Result<Self> {
        let mut policy = Self::new(device, obs_dim, action_space, hidden)?;
        policy.latent.var_store.load(path)?;
        Ok(policy)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.latent.var_store().save(path)?;
        Ok(())
    }

    fn rescale(&self, unit: Vec<f32>) -> Vec<f32> {
        unit.into_iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(a, (&lo, &hi))| {
                if lo.is_finite() && hi.is_finite() {
                    lo + (a + 1.0) * 0.5 * (hi - lo)
                } else {
                    a
                }
            })
            .collect()
    }
}

impl Policy<Vec<f32>, Vec<f32>> for SacPolicy {
    fn predict(&self, state: &Vec<f32>, deterministic: bool) -> Result<Vec<f32>> {
        if state.len() != self.obs_dim {
            return Err(Error::ShapeMismatch {
                context: "policy observation",
                expected: self.obs_dim,
                actual: state.len(),
            });
        }
        let _no_grad_guard = tch::no_grad_guard();
        let xs = state.to_tensor().to(self.latent.device());
        let latent = self.latent.model.forward(&xs);
        let mu = self.mu.forward(&latent);

        let squashed: Tensor = if deterministic {
            mu.tanh()
        } else {
            let std = self.log_std.forward(&latent).clamp(LOG_STD_MIN, LOG_STD_MAX).exp();
            (&mu + mu.randn_like() * std).tanh()
        };
        let unit = Vec::<f32>::try_from(&squashed.squeeze_dim(0).to_device(Device::Cpu))?;
        Ok(self.rescale(unit))
    }
}
