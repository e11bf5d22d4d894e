use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::environment::{Environment, StepInfo, StepResult};
use crate::error::{Error, Result};
use crate::spaces::{Space, Value};

/// Keeps only the named channels of a dict observation.
pub struct FilterObservation<E> {
    inner: E,
    keys: Vec<String>,
    observation_space: Space,
}

impl<E> FilterObservation<E>
where
    E: Environment<Observation = Value>,
{
    /// Fails if any key is not a channel of the wrapped environment.
    pub fn new<S: AsRef<str>>(inner: E, keys: &[S]) -> Result<Self> {
        let observation_space = inner.observation_space().subset(keys)?;
        Ok(Self {
            inner,
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            observation_space,
        })
    }

    fn filter(&self, observation: Value) -> Result<Value> {
        let Value::Dict(mut channels) = observation else {
            return Err(Error::OutOfSpace("filtered observation must be a dict".into()));
        };
        let mut kept = BTreeMap::new();
        for key in &self.keys {
            let value = channels
                .remove(key)
                .ok_or_else(|| Error::UnknownChannel(key.clone()))?;
            kept.insert(key.clone(), value);
        }
        Ok(Value::Dict(kept))
    }
}

#[async_trait(?Send)]
impl<E> Environment for FilterObservation<E>
where
    E: Environment<Observation = Value>,
{
    type Observation = Value;
    type Action = E::Action;

    async fn reset(&mut self) -> Result<(Value, StepInfo)> {
        let (observation, info) = self.inner.reset().await?;
        Ok((self.filter(observation)?, info))
    }

    async fn step(&mut self, action: &E::Action) -> Result<StepResult<Value>> {
        self.inner
            .step(action)
            .await?
            .try_map_observation(|observation| self.filter(observation))
    }

    fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    fn action_space(&self) -> &Space {
        self.inner.action_space()
    }
}
