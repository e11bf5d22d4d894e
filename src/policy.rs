use crate::error::Result;

pub trait Policy<S, A> {
    /// Chooses an action for `state`. `deterministic == false` samples from
    /// the policy distribution instead of taking its mode.
    fn predict(&self, state: &S, deterministic: bool) -> Result<A>;
}
