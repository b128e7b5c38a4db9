use std::fmt::Debug;
use std::path::PathBuf;

use burn::{
    module::Module,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    record::RecorderError,
    tensor::backend::AutodiffBackend,
};
use nn::loss::{HuberLoss, HuberLossConfig, Reduction};
use rand::{thread_rng, Rng};

use crate::{
    assert_interval,
    checkpoint::{self, AdamOptimizer, Checkpoint},
    decay,
    exploration::{Choice, EpsilonGreedy},
    memory::{Observation, PendingTransition, ReplayMemory},
    network::{QNetwork, QNetworkConfig},
};

/// A discrete steering command relative to the agent's current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Straight,
    Right,
    Left,
}

impl From<usize> for Direction {
    fn from(action: usize) -> Self {
        match action {
            0 => Self::Straight,
            1 => Self::Right,
            _ => Self::Left,
        }
    }
}

/// Configuration for the [`DQNAgent`]
pub struct DQNAgentConfig {
    /// Architecture of the Q-value network
    pub network: QNetworkConfig,
    /// Maximum number of transitions held in replay memory
    pub memory_capacity: usize,
    /// Number of transitions sampled for one optimization step
    pub batch_size: usize,
    /// The exploration policy, currently limited to epsilon greedy
    pub exploration: EpsilonGreedy<decay::Exponential>,
    /// The discount factor
    pub gamma: f32,
    /// The learning rate for the optimizer
    pub lr: f32,
    /// Where checkpoints are written; the recorder appends its own extension
    pub checkpoint_path: PathBuf,
}

impl Default for DQNAgentConfig {
    fn default() -> Self {
        Self {
            network: QNetworkConfig::new(),
            memory_capacity: 100_000,
            batch_size: 100,
            exploration: EpsilonGreedy::new(
                decay::Exponential::new(1.0 / 200.0, 0.9, 0.05).unwrap(),
            ),
            gamma: 0.9,
            lr: 1e-3,
            checkpoint_path: PathBuf::from("lastModel/trained_model"),
        }
    }
}

/// A deep Q-learning steering controller
///
/// Consumes one observation vector and the previous action's reward per
/// environment tick and returns the next [`Direction`] to steer. A single
/// network produces both the action values and the bootstrap targets; only
/// the prediction side receives gradients.
pub struct DQNAgent<B: AutodiffBackend> {
    net: Option<QNetwork<B>>,
    optimizer: AdamOptimizer<B>,
    loss: HuberLoss<B>,
    memory: ReplayMemory,
    exploration: EpsilonGreedy<decay::Exponential>,
    pending: PendingTransition,
    device: B::Device,
    observation_dim: usize,
    action_dim: usize,
    batch_size: usize,
    gamma: f32,
    lr: f32,
    checkpoint_path: PathBuf,
    steps_done: u32,
}

impl<B: AutodiffBackend> DQNAgent<B> {
    /// Initialize a new `DQNAgent`
    ///
    /// ### Arguments
    /// - `config` A [`DQNAgentConfig`] containing components and hyperparameters for the agent
    /// - `device` The device all tensors entering the controller are placed on
    pub fn new(config: DQNAgentConfig, device: &B::Device) -> Self {
        assert_interval!(config.gamma, 0.0, 1.0);
        assert!(
            config.batch_size > 0 && config.batch_size <= config.memory_capacity,
            "batch size must be non-zero and fit in replay memory"
        );

        let observation_dim = config.network.input_dim;
        let action_dim = config.network.output_dim;
        Self {
            net: Some(config.network.init(device)),
            optimizer: AdamConfig::new().init(),
            loss: HuberLossConfig::new(1.0).init(device),
            memory: ReplayMemory::new(config.memory_capacity),
            exploration: config.exploration,
            pending: PendingTransition::zeroed(observation_dim),
            device: device.clone(),
            observation_dim,
            action_dim,
            batch_size: config.batch_size,
            gamma: config.gamma,
            lr: config.lr,
            checkpoint_path: config.checkpoint_path,
            steps_done: 0,
        }
    }

    /// Number of interaction steps seen so far; never reset, not even across
    /// checkpoint loads
    pub fn steps_done(&self) -> u32 {
        self.steps_done
    }

    /// Number of transitions currently held in replay memory
    pub fn replay_len(&self) -> usize {
        self.memory.len()
    }

    /// Persist network weights and optimizer state as one checkpoint file
    pub fn save(&self) -> Result<(), RecorderError> {
        let record = Checkpoint {
            model: self.net.clone().unwrap().into_record(),
            optim: self.optimizer.to_record(),
        };
        checkpoint::save(record, &self.checkpoint_path)?;
        log::info!("model successfully saved");
        Ok(())
    }

    /// Restore network weights and optimizer state from the checkpoint file
    ///
    /// ### Returns
    /// - `Ok(true)` if a checkpoint was found and restored
    /// - `Ok(false)` if no checkpoint file exists yet; the fresh weights stay
    ///   in place so training starts from scratch
    pub fn load(&mut self) -> Result<bool, RecorderError> {
        let Some(record) = checkpoint::load::<B>(&self.checkpoint_path, &self.device)? else {
            return Ok(false);
        };
        self.net = Some(self.net.take().unwrap().load_record(record.model));
        self.optimizer = AdamConfig::new().init().load_record(record.optim);
        log::info!("model successfully loaded");
        Ok(true)
    }
}

impl<B: AutodiffBackend> DQNAgent<B>
where
    B::IntElem: TryInto<usize, Error: Debug>,
{
    /// Invoke the exploration policy to choose an action from the given
    /// observation
    ///
    /// Increments the step counter on every call, so the epsilon threshold
    /// decays with interaction count rather than with finished episodes.
    pub fn select_action(&mut self, observation: &[f32]) -> usize {
        let choice = self.exploration.choose(self.steps_done);
        self.steps_done += 1;

        match choice {
            Choice::Explore => thread_rng().gen_range(0..self.action_dim),
            Choice::Exploit => {
                let input = self.observation_tensor(observation);
                let output = self.net.as_ref().unwrap().forward(input);
                output.argmax(1).into_scalar().try_into().unwrap()
            }
        }
    }

    /// Advance the controller by one environment tick
    ///
    /// `reward` is the reward resulting from the previous action and
    /// `new_observation` the sensor state it led to. Must be called exactly
    /// once per tick: the pending transition from the previous call is
    /// completed with `new_observation` and committed to replay memory before
    /// the next action is chosen.
    pub fn update(&mut self, reward: f32, new_observation: Observation) -> Direction {
        assert_eq!(
            new_observation.len(),
            self.observation_dim,
            "observation dimension mismatch"
        );

        let pending = std::mem::replace(
            &mut self.pending,
            PendingTransition::zeroed(self.observation_dim),
        );
        self.memory.push(pending.complete(new_observation.clone()));
        self.optimize_model();

        let action = self.select_action(&new_observation);
        self.pending = PendingTransition::new(new_observation, action, reward);

        Direction::from(action)
    }

    /// Perform one Q-learning optimization step on a sampled batch
    ///
    /// Does nothing until replay memory holds a full batch; that is the
    /// expected startup condition, not an error.
    pub fn optimize_model(&mut self) {
        let Some(batch) = self.memory.sample_zipped(self.batch_size) else {
            return;
        };

        let states = self.batch_tensor(batch.states);
        let next_states = self.batch_tensor(batch.next_states);
        let actions = batch.actions.iter().map(|&a| a as i32).collect::<Vec<_>>();
        let actions =
            Tensor::<B, 1, Int>::from_ints(actions.as_slice(), &self.device).unsqueeze_dim(1);
        let rewards =
            Tensor::<B, 1>::from_floats(batch.rewards.as_slice(), &self.device).unsqueeze_dim(1);

        let net = self.net.take().unwrap();

        // Q values of the actions actually taken in each sampled state
        let q_values = net.forward(states).gather(1, actions);

        // Maximum Q values obtainable from each next state, estimated by the
        // same network; detached so no gradients flow through the target side
        let next_q = net.forward(next_states).max_dim(1).detach();
        let targets = self.bootstrap_targets(rewards, next_q);

        let loss = self.loss.forward(q_values, targets, Reduction::Mean);

        let grads = GradientsParams::from_grads(loss.backward(), &net);
        self.net = Some(self.optimizer.step(self.lr.into(), net, grads));
    }

    /// r + γ · max<sub>a'</sub> Q(s', a')
    fn bootstrap_targets(&self, rewards: Tensor<B, 2>, next_q: Tensor<B, 2>) -> Tensor<B, 2> {
        rewards + next_q * self.gamma
    }

    fn observation_tensor(&self, observation: &[f32]) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(observation, &self.device)
            .reshape([1, self.observation_dim])
    }

    fn batch_tensor(&self, observations: Vec<Observation>) -> Tensor<B, 2> {
        let rows = observations.len();
        let flat = observations.into_iter().flatten().collect::<Vec<_>>();
        Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([rows, self.observation_dim])
    }
}
