/// A sensor observation vector, one normalized `f32` per signal
pub type Observation = Vec<f32>;

/// Represents a single recorded step of experience
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The observation before taking the action
    pub state: Observation,
    /// The observation after the action was applied
    pub next_state: Observation,
    /// The action taken in `state`
    pub action: usize,
    /// The reward received for taking the action
    pub reward: f32,
}

/// A transition recorded mid-tick, before its outcome is observed
///
/// The controller commits one of these per tick: the next tick's observation
/// completes it into a [`Transition`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransition {
    pub state: Observation,
    pub action: usize,
    pub reward: f32,
}

impl PendingTransition {
    pub fn new(state: Observation, action: usize, reward: f32) -> Self {
        Self {
            state,
            action,
            reward,
        }
    }

    /// The all-zero record that the very first tick completes
    pub fn zeroed(dim: usize) -> Self {
        Self::new(vec![0.0; dim], 0, 0.0)
    }

    /// Commit this record by filling in the observed outcome state
    pub fn complete(self, next_state: Observation) -> Transition {
        Transition {
            state: self.state,
            next_state,
            action: self.action,
            reward: self.reward,
        }
    }
}

/// A zipped batch of [transitions](Transition)
///
/// Index `i` refers to the same original transition across all four fields.
#[derive(Clone, Debug)]
pub struct TransitionBatch {
    pub states: Vec<Observation>,
    pub next_states: Vec<Observation>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f32>,
}

impl TransitionBatch {
    /// Construct a `TransitionBatch` from an iterator of transitions and a
    /// specified batch size
    pub fn from_iter(iter: impl IntoIterator<Item = Transition>, batch_size: usize) -> Self {
        let batch = Self {
            states: Vec::with_capacity(batch_size),
            next_states: Vec::with_capacity(batch_size),
            actions: Vec::with_capacity(batch_size),
            rewards: Vec::with_capacity(batch_size),
        };

        iter.into_iter().fold(batch, |mut b, t| {
            b.states.push(t.state);
            b.next_states.push(t.next_state);
            b.actions.push(t.action);
            b.rewards.push(t.reward);
            b
        })
    }
}
