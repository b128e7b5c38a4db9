use burn::{prelude::*, tensor::activation::relu};
use nn::{Linear, LinearConfig};

/// A feed-forward Q-value estimator with one or two hidden stages
///
/// Maps a batch of observation vectors to one value estimate per discrete
/// action. All linear stages carry biases; there are no normalization layers.
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Option<Linear<B>>,
    out: Linear<B>,
}

#[derive(Config, Debug)]
pub struct QNetworkConfig {
    /// Observation vector dimension
    #[config(default = 5)]
    pub input_dim: usize,
    /// Width of the first hidden stage
    #[config(default = 32)]
    pub hidden1: usize,
    /// Width of the optional second hidden stage
    pub hidden2: Option<usize>,
    /// Number of discrete actions
    #[config(default = 3)]
    pub output_dim: usize,
}

impl QNetworkConfig {
    /// Initialize a [`QNetwork`] on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        assert!(self.input_dim > 0, "observation dimension must be non-zero");
        assert!(self.hidden1 > 0, "hidden layer width must be non-zero");
        assert!(
            self.hidden2.map_or(true, |h| h > 0),
            "hidden layer width must be non-zero"
        );
        assert!(self.output_dim > 0, "action count must be non-zero");

        let penultimate = self.hidden2.unwrap_or(self.hidden1);
        QNetwork {
            fc1: LinearConfig::new(self.input_dim, self.hidden1).init(device),
            fc2: self
                .hidden2
                .map(|h| LinearConfig::new(self.hidden1, h).init(device)),
            out: LinearConfig::new(penultimate, self.output_dim).init(device),
        }
    }
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass through the network, `[N, D] -> [N, A]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = relu(self.fc1.forward(input));
        if let Some(fc2) = &self.fc2 {
            x = relu(fc2.forward(x));
        }
        self.out.forward(x)
    }
}
