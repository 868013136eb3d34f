//! Search configuration.

/// Whose point of view the exploitation term is read from during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Perspective {
    /// Use the accumulated agent-perspective score at every level, for both sides.
    AgentAlways,
    /// Negate the mean score at nodes where the opponent is choosing, so each side
    /// picks the child that is best for itself. Stored scores stay agent-perspective.
    #[default]
    MoverRelative,
}

/// Tunables for one search.
///
/// ```
/// use ttt_mcts::SearchConfig;
///
/// let config = SearchConfig::default().with_seed(111).with_exploration(1.4);
/// assert_eq!(config.seed, Some(111));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Exploration constant `C` in UCB1.
    pub exploration: f64,
    pub perspective: Perspective,
    /// Seed for the rollout RNG; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub const DEFAULT_EXPLORATION: f64 = 2.0;

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: Self::DEFAULT_EXPLORATION,
            perspective: Perspective::default(),
            seed: None,
        }
    }
}
