//! Drives the learning core through a scripted, headless arena until the
//! iteration cap signals training completion.

use std::path::Path;

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use once_cell::sync::Lazy;

use nav_dqn::agent::{DQNAgent, DQNAgentConfig, Direction};
use nav_dqn::episode::{EpisodeManager, EpisodeStatus};

type TrainingBackend = Autodiff<NdArray>;

static DEVICE: Lazy<NdArrayDevice> = Lazy::new(Default::default);

const MAX_ITERATIONS: u32 = 2;

/// A one-dimensional stand-in for the arena: the agent starts at a fixed
/// distance from the goal and every steering command closes some of it.
struct LineArena {
    distance: f32,
}

impl LineArena {
    const START_DISTANCE: f32 = 300.0;
    const STEP_SIZE: f32 = 8.0;

    fn new() -> Self {
        Self {
            distance: Self::START_DISTANCE,
        }
    }

    fn reset(&mut self) {
        self.distance = Self::START_DISTANCE;
    }

    /// Five sensor signals derived from the remaining distance
    fn observe(&self) -> Vec<f32> {
        let d = self.distance / Self::START_DISTANCE;
        vec![d, 1.0 - d, d * 0.5, 0.0, 1.0]
    }

    /// Apply a steering command; heading straight closes in fastest
    fn advance(&mut self, direction: Direction) -> f32 {
        match direction {
            Direction::Straight => {
                self.distance -= Self::STEP_SIZE;
                0.1
            }
            Direction::Right | Direction::Left => {
                self.distance -= Self::STEP_SIZE / 2.0;
                -0.2
            }
        }
    }
}

fn arena_config(checkpoint_path: &Path) -> DQNAgentConfig {
    DQNAgentConfig {
        memory_capacity: 512,
        batch_size: 8,
        checkpoint_path: checkpoint_path.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn scripted_goal_seeking_run() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint_path = dir.path().join("trained_model");

    let mut agent = DQNAgent::<TrainingBackend>::new(arena_config(&checkpoint_path), &*DEVICE);
    let mut manager = EpisodeManager::new(MAX_ITERATIONS);
    let mut arena = LineArena::new();

    let mut reward = 0.0;
    let mut cumulative_reward = 0.0;
    let mut finished_episodes = 0;
    let mut ticks = 0u32;

    loop {
        ticks += 1;
        assert!(ticks < 1000, "scripted run failed to terminate");

        let direction = agent.update(reward, arena.observe());
        reward = arena.advance(direction);
        cumulative_reward += reward;

        match manager
            .check_iteration(arena.distance, &agent, cumulative_reward, 0)
            .unwrap()
        {
            EpisodeStatus::Running => {}
            EpisodeStatus::Finished => {
                finished_episodes += 1;
                cumulative_reward = 0.0;
                arena.reset();
            }
            EpisodeStatus::TrainingComplete => {
                finished_episodes += 1;
                break;
            }
        }
    }

    assert_eq!(
        finished_episodes,
        MAX_ITERATIONS + 1,
        "the cap ends the run one episode past the maximum"
    );
    assert_eq!(manager.current_iteration(), MAX_ITERATIONS + 1);
    assert_eq!(agent.steps_done(), ticks, "one action selected per tick");
    assert_eq!(
        agent.replay_len() as u32,
        ticks,
        "one transition committed per tick"
    );
    assert!(
        checkpoint_path.with_extension("bin").is_file(),
        "final checkpoint written"
    );

    let mut restored = DQNAgent::<TrainingBackend>::new(arena_config(&checkpoint_path), &*DEVICE);
    assert!(
        restored.load().unwrap(),
        "a fresh controller picks the checkpoint back up"
    );
}
