use rand::{thread_rng, Rng};

use crate::decay::Decay;

/// Exploration policy result
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Invoke epsilon greedy policy for the current interaction step
    pub fn choose(&self, step: u32) -> Choice {
        let epsilon = self.epsilon.evaluate(step as f32);
        if thread_rng().gen::<f32>() > epsilon {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::decay::Constant;

    use super::*;

    #[test]
    fn pinned_policies() {
        let greedy = EpsilonGreedy::new(Constant::new(-1.0));
        let random = EpsilonGreedy::new(Constant::new(1.0));

        for step in 0..100 {
            assert!(
                matches!(greedy.choose(step), Choice::Exploit),
                "threshold below every draw always exploits"
            );
            assert!(
                matches!(random.choose(step), Choice::Explore),
                "threshold above every draw always explores"
            );
        }
    }
}
