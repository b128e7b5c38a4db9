use burn::{record::RecorderError, tensor::backend::AutodiffBackend};

use crate::agent::DQNAgent;

/// Distance to the goal under which an attempt counts as finished
const GOAL_RADIUS: f32 = 60.0;

/// Reward bonus credited for reaching the goal in the episode summary log
const GOAL_BONUS: f32 = 200.0;

/// A checkpoint is written every this many finished episodes
const CHECKPOINT_INTERVAL: u32 = 5;

/// Outcome of an episode boundary check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// The goal has not been reached; the attempt continues
    Running,
    /// The goal was reached; the caller should reset the arena
    Finished,
    /// The iteration cap was exceeded and a final checkpoint was written;
    /// the host decides whether to terminate
    TrainingComplete,
}

/// Tracks completed attempts and decides when training is over
///
/// Whenever the agent reaches its goal a new iteration begins, but only if
/// the maximum number of iterations is not yet exceeded. Iteration summaries
/// are emitted through the logging facade.
pub struct EpisodeManager {
    current_iteration: u32,
    max_iterations: u32,
}

impl EpisodeManager {
    pub fn new(max_iterations: u32) -> Self {
        Self {
            current_iteration: 0,
            max_iterations,
        }
    }

    /// Number of completed attempts so far
    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    /// Check whether the agent is currently close enough to the goal for the
    /// attempt to count as finished
    ///
    /// On a finished attempt the iteration counter advances. Past the
    /// configured cap the model is saved one final time and
    /// [`EpisodeStatus::TrainingComplete`] is returned; otherwise the episode
    /// summary is logged and a checkpoint is written every fifth episode.
    pub fn check_iteration<B: AutodiffBackend>(
        &mut self,
        distance: f32,
        agent: &DQNAgent<B>,
        cumulative_reward: f32,
        walls_touched: u32,
    ) -> Result<EpisodeStatus, RecorderError> {
        // not `>=`: a NaN distance must never finish an attempt
        if !(distance < GOAL_RADIUS) {
            return Ok(EpisodeStatus::Running);
        }
        self.current_iteration += 1;

        if self.current_iteration > self.max_iterations {
            agent.save()?;
            log::info!("max number of iterations is reached");
            return Ok(EpisodeStatus::TrainingComplete);
        }

        log::info!(
            "iteration {}: cumulative reward: {}, walls touched: {}",
            self.current_iteration,
            cumulative_reward + GOAL_BONUS,
            walls_touched
        );
        if self.current_iteration % CHECKPOINT_INTERVAL == 0 {
            agent.save()?;
        }
        Ok(EpisodeStatus::Finished)
    }
}
