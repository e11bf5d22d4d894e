//! Structured observation/action spaces and their flat numeric encoding.
//!
//! Dict keys are kept in a `BTreeMap`, so flattening always walks channels in
//! sorted key order. A `{throttle, steer}` action flattens to `[steer, throttle]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Per-element bounds, `low.len() == high.len() == shape.iter().product()`.
    Box {
        low: Vec<f32>,
        high: Vec<f32>,
        shape: Vec<usize>,
    },
    Discrete(usize),
    Dict(BTreeMap<String, Space>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Array(Vec<f32>),
    Discrete(usize),
    Dict(BTreeMap<String, Value>),
}

impl Space {
    /// Box with the same bounds on every element.
    pub fn uniform(low: f32, high: f32, shape: &[usize]) -> Self {
        let n = shape.iter().product();
        Space::Box {
            low: vec![low; n],
            high: vec![high; n],
            shape: shape.to_vec(),
        }
    }

    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Space)>) -> Self {
        Space::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Length of the flat vector this space encodes to.
    pub fn flatdim(&self) -> usize {
        match self {
            Space::Box { low, .. } => low.len(),
            Space::Discrete(n) => *n,
            Space::Dict(spaces) => spaces.values().map(Space::flatdim).sum(),
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        match self {
            Space::Dict(spaces) => spaces.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Dict restricted to `keys`. Every key must already exist.
    pub fn subset<S: AsRef<str>>(&self, keys: &[S]) -> Result<Space> {
        let Space::Dict(spaces) = self else {
            return Err(Error::OutOfSpace("subset of a non-dict space".into()));
        };
        let mut picked = BTreeMap::new();
        for key in keys {
            let key = key.as_ref();
            let space = spaces
                .get(key)
                .ok_or_else(|| Error::UnknownChannel(key.to_string()))?;
            picked.insert(key.to_string(), space.clone());
        }
        Ok(Space::Dict(picked))
    }

    /// The flat Box that [`Space::flatten`] maps into.
    pub fn flatten_space(&self) -> Space {
        let (mut low, mut high) = (Vec::new(), Vec::new());
        self.collect_bounds(&mut low, &mut high);
        let n = low.len();
        Space::Box {
            low,
            high,
            shape: vec![n],
        }
    }

    fn collect_bounds(&self, low: &mut Vec<f32>, high: &mut Vec<f32>) {
        match self {
            Space::Box { low: l, high: h, .. } => {
                low.extend_from_slice(l);
                high.extend_from_slice(h);
            }
            Space::Discrete(n) => {
                low.extend(std::iter::repeat_n(0.0, *n));
                high.extend(std::iter::repeat_n(1.0, *n));
            }
            Space::Dict(spaces) => spaces
                .values()
                .for_each(|space| space.collect_bounds(low, high)),
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (Space::Box { low, high, .. }, Value::Array(xs)) => {
                xs.len() == low.len()
                    && xs
                        .iter()
                        .zip(low.iter().zip(high))
                        .all(|(x, (lo, hi))| x >= lo && x <= hi)
            }
            (Space::Discrete(n), Value::Discrete(k)) => k < n,
            (Space::Dict(spaces), Value::Dict(values)) => {
                values.len() == spaces.len()
                    && spaces
                        .iter()
                        .all(|(key, space)| values.get(key).is_some_and(|v| space.contains(v)))
            }
            _ => false,
        }
    }

    pub fn flatten(&self, value: &Value) -> Result<Vec<f32>> {
        let mut out = Vec::with_capacity(self.flatdim());
        self.flatten_into(value, &mut out)?;
        Ok(out)
    }

    fn flatten_into(&self, value: &Value, out: &mut Vec<f32>) -> Result<()> {
        match (self, value) {
            (Space::Box { low, .. }, Value::Array(xs)) => {
                if xs.len() != low.len() {
                    return Err(Error::ShapeMismatch {
                        context: "box flatten",
                        expected: low.len(),
                        actual: xs.len(),
                    });
                }
                out.extend_from_slice(xs);
            }
            (Space::Discrete(n), Value::Discrete(k)) => {
                if k >= n {
                    return Err(Error::OutOfSpace(format!("discrete {k} not below {n}")));
                }
                out.extend((0..*n).map(|i| if i == *k { 1.0 } else { 0.0 }));
            }
            (Space::Dict(spaces), Value::Dict(values)) => {
                for (key, space) in spaces {
                    let value = values
                        .get(key)
                        .ok_or_else(|| Error::UnknownChannel(key.clone()))?;
                    space.flatten_into(value, out)?;
                }
            }
            (space, value) => {
                return Err(Error::OutOfSpace(format!(
                    "{value:?} does not match {space:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn unflatten(&self, flat: &[f32]) -> Result<Value> {
        if flat.len() != self.flatdim() {
            return Err(Error::ShapeMismatch {
                context: "unflatten",
                expected: self.flatdim(),
                actual: flat.len(),
            });
        }
        Ok(self.unflatten_from(flat))
    }

    // Caller guarantees `flat.len() == self.flatdim()`.
    fn unflatten_from(&self, flat: &[f32]) -> Value {
        match self {
            Space::Box { .. } => Value::Array(flat.to_vec()),
            // argmax rather than exact one-hot, so a policy's soft output still decodes
            Space::Discrete(_) => Value::Discrete(
                flat.iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map_or(0, |(i, _)| i),
            ),
            Space::Dict(spaces) => {
                let mut offset = 0;
                let mut values = BTreeMap::new();
                for (key, space) in spaces {
                    let n = space.flatdim();
                    values.insert(key.clone(), space.unflatten_from(&flat[offset..offset + n]));
                    offset += n;
                }
                Value::Dict(values)
            }
        }
    }
}

impl Value {
    pub fn scalar(x: f32) -> Self {
        Value::Array(vec![x])
    }

    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(values) => values.get(key),
            _ => None,
        }
    }

    /// First element of an array value.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Array(xs) => xs.first().copied(),
            Value::Discrete(k) => Some(*k as f32),
            Value::Dict(_) => None,
        }
    }
}
