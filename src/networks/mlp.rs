use tch::{Device, nn};

/// ReLU hidden stack. Heads are added on `var_store().root()` by the owner.
pub struct MLP {
    pub model: nn::Sequential,
    pub var_store: nn::VarStore, // 保存 VarStore 的所有权
    output_dim: i64,
}

impl MLP {
    pub fn new(vs: nn::VarStore, input_dim: i64, hidden: &[i64]) -> Self {
        let (model, width) = {
            let root = &vs.root() / "latent_pi";
            let mut model = nn::seq();
            let mut width = input_dim;
            for (i, &h) in hidden.iter().enumerate() {
                model = model
                    .add(nn::linear(&root / format!("layer{i}"), width, h, Default::default()))
                    .add_fn(|xs| xs.relu());
                width = h;
            }
            (model, width)
        };
        MLP {
            model,
            var_store: vs,
            output_dim: width,
        }
    }

    /// Width of the last hidden layer (the input width if there are none).
    pub fn output_dim(&self) -> i64 {
        self.output_dim
    }

    pub fn var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    pub fn device(&self) -> Device {
        self.var_store.device()
    }
}
