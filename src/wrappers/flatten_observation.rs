use async_trait::async_trait;

use crate::environment::{Environment, StepInfo, StepResult};
use crate::error::Result;
use crate::spaces::{Space, Value};

/// Encodes a structured observation as one flat vector.
pub struct FlattenObservation<E> {
    inner: E,
    structured_space: Space,
    observation_space: Space,
}

impl<E> FlattenObservation<E>
where
    E: Environment<Observation = Value>,
{
    pub fn new(inner: E) -> Self {
        let structured_space = inner.observation_space().clone();
        let observation_space = structured_space.flatten_space();
        Self {
            inner,
            structured_space,
            observation_space,
        }
    }
}

#[async_trait(?Send)]
impl<E> Environment for FlattenObservation<E>
where
    E: Environment<Observation = Value>,
{
    type Observation = Vec<f32>;
    type Action = E::Action;

    async fn reset(&mut self) -> Result<(Vec<f32>, StepInfo)> {
        let (observation, info) = self.inner.reset().await?;
        Ok((self.structured_space.flatten(&observation)?, info))
    }

    async fn step(&mut self, action: &E::Action) -> Result<StepResult<Vec<f32>>> {
        self.inner
            .step(action)
            .await?
            .try_map_observation(|observation| self.structured_space.flatten(&observation))
    }

    fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    fn action_space(&self) -> &Space {
        self.inner.action_space()
    }
}
