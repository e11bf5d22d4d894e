use async_trait::async_trait;

use crate::environment::{Environment, StepInfo, StepResult};
use crate::error::Result;
use crate::spaces::{Space, Value};

/// Accepts flat action vectors and decodes them into the wrapped
/// environment's structured action space.
pub struct FlattenAction<E> {
    inner: E,
    structured_space: Space,
    action_space: Space,
}

impl<E> FlattenAction<E>
where
    E: Environment<Action = Value>,
{
    pub fn new(inner: E) -> Self {
        let structured_space = inner.action_space().clone();
        let action_space = structured_space.flatten_space();
        Self {
            inner,
            structured_space,
            action_space,
        }
    }
}

#[async_trait(?Send)]
impl<E> Environment for FlattenAction<E>
where
    E: Environment<Action = Value>,
{
    type Observation = E::Observation;
    type Action = Vec<f32>;

    async fn reset(&mut self) -> Result<(E::Observation, StepInfo)> {
        self.inner.reset().await
    }

    async fn step(&mut self, action: &Vec<f32>) -> Result<StepResult<E::Observation>> {
        let structured = self.structured_space.unflatten(action)?;
        self.inner.step(&structured).await
    }

    fn observation_space(&self) -> &Space {
        self.inner.observation_space()
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }
}
