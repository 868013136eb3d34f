use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use crate::config::{Perspective, SearchConfig};
use crate::error::{Result, SearchError};
use crate::game::Game;

/// Index of a node inside its [`Tree`]. Only the tree hands these out.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NodeId(usize);

pub struct Node<G: Game> {
    position: G,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pending: VecDeque<G>,
    visits: u64,
    score: i64,
}

impl<G: Game> Node<G> {
    fn new(position: G, parent: Option<NodeId>) -> Self {
        let pending = position.successors().into();
        Self {
            position,
            parent,
            children: Vec::new(),
            pending,
            visits: 0,
            score: 0,
        }
    }

    pub fn position(&self) -> &G {
        &self.position
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Sum of agent-perspective outcomes seen through this node.
    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.position.is_terminal()
    }
}

fn ucb1(mean: f64, parent_visits: u64, child_visits: u64, exploration: f64) -> f64 {
    mean + exploration * ((parent_visits as f64).ln() / child_visits as f64).sqrt()
}

/// Search tree stored flat. Children are owned through `children`; `parent` is
/// only followed upwards during backpropagation.
pub struct Tree<G: Game> {
    nodes: Vec<Node<G>>,
}

impl<G: Game> Tree<G> {
    pub fn new(root: G) -> Self {
        Self {
            nodes: vec![Node::new(root, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.0]
    }

    fn insert(&mut self, node: Node<G>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // +1 when the exploitation term should be read as-is at this node, -1 to negate it.
    fn chooser_sign(&self, id: NodeId, perspective: Perspective) -> f64 {
        match perspective {
            Perspective::AgentAlways => 1.0,
            Perspective::MoverRelative => self.get(id).position.next_to_move().sign() as f64,
        }
    }

    /// Picks the child with the highest UCB1 value; the first one wins a tie.
    ///
    /// The node must be fully expanded, and it and every child must have been
    /// visited at least once.
    pub fn select_best_child(&self, id: NodeId, config: &SearchConfig) -> Result<NodeId> {
        let node = self.get(id);
        if !node.is_fully_expanded() {
            return Err(SearchError::NotFullyExpanded {
                node: id.0,
                pending: node.pending.len(),
            });
        }
        if node.children.is_empty() {
            return Err(SearchError::NoChildren { node: id.0 });
        }
        if node.visits == 0 {
            return Err(SearchError::UnvisitedNode { node: id.0 });
        }

        let sign = self.chooser_sign(id, config.perspective);
        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in node.children.iter() {
            let child = self.get(child_id);
            if child.visits == 0 {
                return Err(SearchError::UnvisitedChild {
                    node: id.0,
                    child: child_id.0,
                });
            }
            let mean = sign * child.score as f64 / child.visits as f64;
            let value = ucb1(mean, node.visits, child.visits, config.exploration);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((child_id, value)),
            }
        }
        best.map(|(child_id, _)| child_id)
            .ok_or(SearchError::NoChildren { node: id.0 })
    }

    /// Materializes the next pending successor, in generation order, as a new child.
    pub fn expand(&mut self, id: NodeId) -> Result<NodeId> {
        let position = self
            .get_mut(id)
            .pending
            .pop_front()
            .ok_or(SearchError::NothingToExpand { node: id.0 })?;
        trace!("expanding node {} with move {:?}", id.0, position.last_move());
        let child_id = self.insert(Node::new(position, Some(id)));
        self.get_mut(id).children.push(child_id);
        Ok(child_id)
    }

    /// Plays uniformly random moves from the node's position until the game ends.
    /// The tree is left untouched.
    pub fn simulate<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> i32 {
        let mut current = self.get(id).position.clone();
        while !current.is_terminal() {
            match current.successors().into_iter().choose(rng) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.outcome()
    }

    /// Adds one visit and `outcome` to the node and every ancestor up to the root.
    pub fn backpropagate(&mut self, id: NodeId, outcome: i32) {
        let mut node_id = id;
        loop {
            let node = self.get_mut(node_id);
            node.visits += 1;
            node.score += outcome as i64;
            match node.parent {
                Some(parent_id) => node_id = parent_id,
                None => break,
            }
        }
    }
}

/// When the search loop stops. Checked between cycles, never inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Time(Duration),
    Iterations(u64),
}

/// Statistics of one root child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildStats<M> {
    pub mv: M,
    pub visits: u64,
    pub score: i64,
}

impl<M> ChildStats<M> {
    pub fn win_ratio(&self) -> f64 {
        self.score as f64 / self.visits as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision<M> {
    pub best_move: M,
    pub iterations: u64,
    pub elapsed: Duration,
    /// Root children in expansion order.
    pub children: Vec<ChildStats<M>>,
}

/// Drives selection, expansion, simulation and backpropagation for one decision.
pub struct Mcts<G: Game, R: Rng = StdRng> {
    tree: Tree<G>,
    config: SearchConfig,
    rng: R,
}

impl<G: Game> Mcts<G, StdRng> {
    /// Seeds the rollout RNG from `config.seed`, or from the OS when unset.
    pub fn new(position: G, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(position, config, rng)
    }
}

impl<G: Game, R: Rng> Mcts<G, R> {
    pub fn with_rng(position: G, config: SearchConfig, rng: R) -> Self {
        Self {
            tree: Tree::new(position),
            config,
            rng,
        }
    }

    pub fn tree(&self) -> &Tree<G> {
        &self.tree
    }

    /// Searches until `budget` of wall-clock time has passed.
    pub fn run(&mut self, budget: Duration) -> Result<Decision<G::Move>> {
        self.search(Budget::Time(budget))
    }

    /// Searches for exactly `iterations` cycles (at least one).
    pub fn run_iterations(&mut self, iterations: u64) -> Result<Decision<G::Move>> {
        self.search(Budget::Iterations(iterations))
    }

    /// Runs cycles until the budget is spent and returns the root child with the
    /// best mean score for the side to move. At least one cycle always runs.
    pub fn search(&mut self, budget: Budget) -> Result<Decision<G::Move>> {
        let root = self.tree.root();
        if self.tree.get(root).is_terminal() {
            return Err(SearchError::RootAlreadyTerminal);
        }

        let start = Instant::now();
        let mut iterations = 0u64;
        loop {
            self.iterate()?;
            iterations += 1;
            let done = match budget {
                Budget::Time(limit) => start.elapsed() >= limit,
                Budget::Iterations(limit) => iterations >= limit,
            };
            if done {
                break;
            }
        }
        let elapsed = start.elapsed();

        let children = self.root_stats();
        for stats in children.iter() {
            debug!(
                "move {:?}: visits {} score {} ratio {:.3}",
                stats.mv,
                stats.visits,
                stats.score,
                stats.win_ratio()
            );
        }
        let best_move = self.best_move()?;
        info!(
            "search finished: {} iterations in {:?}, {} nodes, playing {:?}",
            iterations,
            elapsed,
            self.tree.len(),
            best_move
        );
        Ok(Decision {
            best_move,
            iterations,
            elapsed,
            children,
        })
    }

    /// One selection, expansion, simulation and backpropagation cycle.
    fn iterate(&mut self) -> Result<()> {
        let mut node_id = self.tree.root();
        loop {
            let node = self.tree.get(node_id);
            if !node.is_fully_expanded() || node.is_terminal() {
                break;
            }
            node_id = self.tree.select_best_child(node_id, &self.config)?;
        }

        let outcome = if self.tree.get(node_id).is_terminal() {
            self.tree.get(node_id).position.outcome()
        } else {
            node_id = self.tree.expand(node_id)?;
            self.tree.simulate(node_id, &mut self.rng)
        };
        self.tree.backpropagate(node_id, outcome);
        Ok(())
    }

    /// Root children as `(move, visits, score)`, in expansion order.
    pub fn root_stats(&self) -> Vec<ChildStats<G::Move>> {
        let root = self.tree.get(self.tree.root());
        root.children
            .iter()
            .filter_map(|&child_id| {
                let child = self.tree.get(child_id);
                child.position.last_move().map(|mv| ChildStats {
                    mv,
                    visits: child.visits,
                    score: child.score,
                })
            })
            .collect()
    }

    /// Highest mean score among the root's children, not the most visited one.
    /// A child seen once with a single win therefore beats a well-sampled
    /// near-certain winner.
    pub fn best_move(&self) -> Result<G::Move> {
        let root = self.tree.root();
        let sign = self.tree.chooser_sign(root, self.config.perspective);
        let mut best: Option<(G::Move, f64)> = None;
        for &child_id in self.tree.get(root).children.iter() {
            let child = self.tree.get(child_id);
            if child.visits == 0 {
                return Err(SearchError::UnvisitedChild {
                    node: root.0,
                    child: child_id.0,
                });
            }
            let Some(mv) = child.position.last_move() else {
                continue;
            };
            let ratio = sign * child.score as f64 / child.visits as f64;
            match best {
                Some((_, best_ratio)) if ratio <= best_ratio => {}
                _ => best = Some((mv, ratio)),
            }
        }
        best.map(|(mv, _)| mv)
            .ok_or(SearchError::NoChildren { node: root.0 })
    }
}
