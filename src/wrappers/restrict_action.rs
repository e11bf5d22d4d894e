use async_trait::async_trait;

use crate::environment::{Environment, StepInfo, StepResult};
use crate::error::{Error, Result};
use crate::spaces::{Space, Value};

/// Narrows a dict action space to a subset of its fields.
pub struct RestrictAction<E> {
    inner: E,
    action_space: Space,
}

impl<E> RestrictAction<E>
where
    E: Environment<Action = Value>,
{
    pub fn new<S: AsRef<str>>(inner: E, keys: &[S]) -> Result<Self> {
        let action_space = inner.action_space().subset(keys)?;
        Ok(Self {
            inner,
            action_space,
        })
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait(?Send)]
impl<E> Environment for RestrictAction<E>
where
    E: Environment<Action = Value>,
{
    type Observation = E::Observation;
    type Action = Value;

    async fn reset(&mut self) -> Result<(E::Observation, StepInfo)> {
        self.inner.reset().await
    }

    async fn step(&mut self, action: &Value) -> Result<StepResult<E::Observation>> {
        let Value::Dict(fields) = action else {
            return Err(Error::OutOfSpace("restricted action must be a dict".into()));
        };
        let allowed = self.action_space.keys();
        if let Some(key) = fields.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(Error::OutOfSpace(format!("action field `{key}` is not exposed")));
        }
        self.inner.step(action).await
    }

    fn observation_space(&self) -> &Space {
        self.inner.observation_space()
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }
}
