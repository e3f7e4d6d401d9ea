//! Implementation of the Monte Carlo Tree Search (MCTS) algorithm.
//!
//! This module provides the four phases of the search (selection with
//! expansion, random rollout, backpropagation) and the UCB1 rule used both
//! to walk down the tree and to read the final move off the root. It is
//! generic over the game through the [`GameState`] contract.

use std::rc::Rc;

use log::{debug, trace, warn};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use thiserror::Error;

use crate::{tree::count_nodes, utils, Color, GameState, Node, NodeRef, Winner};

/// Statistics and position stored in each node of the search tree.
///
/// # Type Parameters
/// - `S`: The game state type.
pub struct SearchData<S: GameState>{
    /// Independent snapshot of the position at this node.
    pub state: S,
    /// Color that moves from this node, i.e. the one choosing among its children.
    pub color: Color,
    /// Move played by the parent's mover to reach this node. `None` at the root.
    pub action: Option<S::Action>,
    /// Number of rollouts whose path went through this node.
    pub visits: u32,
    /// Signed sum of rollout rewards, see [`Mcts::backpropagate`].
    pub reward: f64
}

impl<S: GameState> SearchData<S>{
    /// Creates the data of a node that has never been visited.
    #[inline]
    pub fn new(state: S, color: Color, action: Option<S::Action>) -> Self{
        SearchData { state, color, action, visits: 0, reward: 0.0 }
    }

    /// Average reward per visit (`reward / visits`), `0.0` when unvisited.
    #[inline]
    pub fn mean(&self) -> f64{
        if self.visits != 0 { self.reward / self.visits as f64 } else { 0.0 }
    }

    /// UCB1 score of this node as a child of a parent visited
    /// `exp(ln_parent_visits)` times.
    ///
    /// The node must have been visited at least once.
    #[inline]
    fn ucb_score(&self, ln_parent_visits: f64, scalar: f64) -> f64{
        let visits = self.visits as f64;
        let exploit = self.reward / visits;

        if scalar > 0.0 {
            let explore = (2.0 * ln_parent_visits / visits).sqrt();
            exploit + scalar * explore
        }
        else{
            exploit
        }
    }
}

/// A node of the search tree.
pub type SearchNode<S> = Node<SearchData<S>>;
/// Strong reference to a node of the search tree.
pub type SearchNodeRef<S> = NodeRef<SearchData<S>>;

impl<S: GameState> Node<SearchData<S>>{
    /// Appends a fresh child (no visit, no reward) reached by `action`.
    ///
    /// The legality of `action` is not checked here, this is up to the caller.
    ///
    /// # Parameters
    /// - `node`: The parent node.
    /// - `child_state`: The position after `action`, owned by the child.
    /// - `action`: The move leading from `node` to the child.
    /// - `color`: The color moving from the child.
    ///
    /// # Returns
    /// Reference to the newly created child node
    #[inline]
    pub fn add_child(node: &SearchNodeRef<S>, child_state: S, action: S::Action, color: Color) -> SearchNodeRef<S>{
        Node::push_child(node, SearchData::new(child_state, color, Some(action)))
    }

    /// Returns `true` once every legal action of the mover has its child.
    ///
    /// A node whose mover has no legal action is trivially fully expanded.
    #[inline]
    pub fn fully_expanded(&self) -> bool{
        let data = self.get();
        data.state.legal_actions(data.color).len() == self.len()
    }
}

/// Represents possible errors of the search.
#[derive(Debug, Error, PartialEq)]
pub enum MctsError{
    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The searching color has no legal move in the position it was asked to play.
    #[error("no legal action for {0:?}")]
    NoLegalActions(Color),
    /// A symbol that names neither color.
    #[error("invalid color symbol {0:?}, expected 'X' or 'O'")]
    InvalidColor(char)
}

/// Configuration parameters for a search.
#[derive(Clone, Debug, PartialEq)]
pub struct MctsConfig{
    /// The color the search plays for.
    pub color: Color,
    /// Number of select, simulate, backpropagate iterations per move.
    pub max_times: u32,
    /// The UCB exploration scalar used while walking down the tree.
    ///
    /// A higher value encourages exploring less visited children.
    pub exploration: f64,
    /// Probability of expanding a node that still has untried actions
    /// instead of descending into one of its children.
    pub expand_probability: f64,
    /// Maximum number of half-moves of a rollout.
    pub rollout_limit: u32,
    /// An optional seed for the random number generator.
    ///
    /// With `Some(value)` two searches from the same position return the same
    /// move. With `None` the generator is seeded from the operating system.
    pub seed: Option<u64>
}

impl MctsConfig{
    /// The default configuration.
    ///
    /// - `color`: `Color::Black`
    /// - `max_times`: 250
    /// - `exploration`: 2.0
    /// - `expand_probability`: 0.8
    /// - `rollout_limit`: 64
    /// - `seed`: `None`
    pub const DEFAULT: MctsConfig = MctsConfig{
        color: Color::Black,
        max_times: 250,
        exploration: 2.0,
        expand_probability: 0.8,
        rollout_limit: 64,
        seed: None
    };

    /// Default configuration playing for `color`.
    #[inline]
    pub fn for_color(color: Color) -> Self{
        MctsConfig { color, ..Self::DEFAULT }
    }

    pub fn with_max_times(mut self, max_times: u32) -> Self{
        self.max_times = max_times;
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self{
        self.exploration = exploration;
        self
    }

    pub fn with_expand_probability(mut self, probability: f64) -> Self{
        self.expand_probability = probability;
        self
    }

    pub fn with_rollout_limit(mut self, rollout_limit: u32) -> Self{
        self.rollout_limit = rollout_limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self{
        self.seed = Some(seed);
        self
    }

    /// Checks that every parameter is within its valid range.
    ///
    /// # Returns
    /// `Err(MctsError::InvalidConfig(_))` describing the first invalid value.
    pub fn validate(&self) -> Result<(), MctsError>{
        if self.max_times == 0 {
            return Err(MctsError::InvalidConfig("max_times must be positive".to_string()));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(MctsError::InvalidConfig(
                format!("exploration must be a non-negative number, got {}", self.exploration)
            ));
        }

        if !(0.0..=1.0).contains(&self.expand_probability) {
            return Err(MctsError::InvalidConfig(
                format!("expand_probability must be within [0, 1], got {}", self.expand_probability)
            ));
        }

        Ok(())
    }
}

impl Default for MctsConfig{
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Visit statistics of one child of the root after a search.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildStats<A>{
    pub action: A,
    pub visits: u32,
    pub reward: f64,
    pub mean: f64
}

/// Outcome of a full search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult<A>{
    /// Move of the best root child, `None` if the root could not be expanded.
    pub action: Option<A>,
    /// Visits of the root, one per iteration.
    pub root_visits: u32,
    /// Root children in expansion order.
    pub children: Vec<ChildStats<A>>,
    /// Number of nodes in the tree, root included.
    pub nodes: usize
}

/// The Monte Carlo Tree Search engine.
///
/// The engine owns its configuration and random source; the tree itself is
/// built by each call to [`Mcts::search`] and dropped at the end of it.
pub struct Mcts{
    config: MctsConfig,
    rng: StdRng
}

impl Mcts{
    /// Creates an engine with the default configuration playing for `color`.
    #[inline]
    pub fn new(color: Color) -> Self{
        Mcts { config: MctsConfig::for_color(color), rng: StdRng::from_os_rng() }
    }

    /// Creates an engine from a specified configuration.
    ///
    /// # Returns
    /// `Err(MctsError::InvalidConfig(_))` if the configuration does not validate.
    pub fn from_config(config: &MctsConfig) -> Result<Self, MctsError>{
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng()
        };

        Ok(Mcts { config: config.clone(), rng })
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig{
        &self.config
    }

    /// Walks down from `node` and returns the node a rollout should start from.
    ///
    /// While the position is not over: a leaf is expanded, a node with
    /// untried actions is expanded with probability `expand_probability` and
    /// otherwise descended through UCB, a fully expanded node is descended
    /// through UCB. A finished position is returned as is.
    pub fn select<S: GameState>(&mut self, node: &SearchNodeRef<S>) -> SearchNodeRef<S>{
        let mut node = Rc::clone(node);

        loop {
            let (is_end, is_leaf, fully_expanded) = {
                let current = node.borrow();
                (current.get().state.is_end(), current.is_leaf(), current.fully_expanded())
            };

            if is_end {
                return node;
            }

            if is_leaf || (!fully_expanded && self.rng.random::<f64>() < self.config.expand_probability) {
                return self.expand_or_stay(node);
            }

            match self.ucb(&node, self.config.exploration) {
                Some(child) => node = child,
                None => return node
            }
        }
    }

    /// Expands `node`, falling back to its parent, or to `node` itself when
    /// it is the root.
    fn expand_or_stay<S: GameState>(&mut self, node: SearchNodeRef<S>) -> SearchNodeRef<S>{
        match self.expand(&node) {
            Some(next) => next,
            None => {
                warn!("cannot expand the root, rolling out from it");
                node
            }
        }
    }

    /// Creates one child of `node` for an action not tried yet.
    ///
    /// The action is drawn uniformly among the untried legal actions of the
    /// mover; the child gets a copy of the position with that action applied
    /// and the opponent as mover.
    ///
    /// # Returns
    /// The new child. If the mover has no untried action left (in particular
    /// no legal action at all), the parent of `node`, which is `None` at the
    /// root.
    pub fn expand<S: GameState>(&mut self, node: &SearchNodeRef<S>) -> Option<SearchNodeRef<S>>{
        let expansion = {
            let current = node.borrow();
            let data = current.get();

            let legal = data.state.legal_actions(data.color);
            let tried: Vec<S::Action> = current.children()
                .iter()
                .filter_map(|child| child.borrow().get().action.clone())
                .collect();

            let expansion = utils::sample_untried(&legal, &tried, &mut self.rng).map(|action| {
                let mut state = data.state.clone();
                state.apply_move(&action, data.color);
                (state, action, data.color.opponent())
            });
            expansion
        };

        match expansion {
            Some((state, action, color)) => {
                trace!("expanding {:?}, {:?} to move", action, color);
                Some(SearchNode::add_child(node, state, action, color))
            }
            None => {
                let parent = node.borrow().get_parent();
                parent
            }
        }
    }

    /// Chooses a child of `node` with the UCB1 rule.
    ///
    /// Unvisited children come first, chosen uniformly among themselves.
    /// Otherwise each child scores `reward / visits + scalar *
    /// sqrt(2 ln(parent visits) / visits)` and one of the children with the
    /// exact maximum score is chosen uniformly. With `scalar == 0` this is
    /// the pure exploitation read used to pick the final move.
    ///
    /// # Returns
    /// The chosen child, or the parent of `node` if it has no child.
    pub fn ucb<S: GameState>(&mut self, node: &SearchNodeRef<S>, scalar: f64) -> Option<SearchNodeRef<S>>{
        let current = node.borrow();

        if current.is_leaf() {
            return current.get_parent();
        }

        let unvisited: Vec<&SearchNodeRef<S>> = current.children()
            .iter()
            .filter(|child| child.borrow().get().visits == 0)
            .collect();

        if !unvisited.is_empty() {
            let chosen = unvisited.choose(&mut self.rng).map(|child| Rc::clone(*child));
            return chosen;
        }

        let ln_parent_visits = (current.get().visits as f64).ln();
        let mut best_score = f64::NEG_INFINITY;
        let mut best_children: Vec<&SearchNodeRef<S>> = Vec::new();

        for child in current.children() {
            let score = child.borrow().get().ucb_score(ln_parent_visits, scalar);

            if score > best_score {
                best_score = score;
                best_children.clear();
                best_children.push(child);
            }
            else if score == best_score {
                best_children.push(child);
            }
        }

        let chosen = match best_children.choose(&mut self.rng) {
            Some(child) => Some(Rc::clone(*child)),
            None => current.get_parent()
        };
        chosen
    }

    /// Plays a random continuation of `state` with `color` to move.
    ///
    /// Stops when the game is over or after `rollout_limit` iterations. An
    /// iteration where the mover has to pass lets the opponent play a random
    /// move and gives the turn back, counting as a single iteration.
    ///
    /// # Returns
    /// The board reached at the end of the rollout.
    pub fn rollout<S: GameState>(&mut self, state: &S, color: Color) -> S{
        let mut board = state.clone();
        let mut color = color;
        let mut count = 0;

        while count < self.config.rollout_limit && !board.is_end() {
            let actions = board.legal_actions(color);

            if let Some(action) = actions.choose(&mut self.rng) {
                board.apply_move(action, color);
                color = color.opponent();
            }
            else{
                color = color.opponent();

                let actions = board.legal_actions(color);
                match actions.choose(&mut self.rng) {
                    Some(action) => board.apply_move(action, color),
                    None => break
                }

                color = color.opponent();
            }

            count += 1;
        }

        board
    }

    /// Estimates the value of `node` with one random rollout.
    ///
    /// # Returns
    /// The final margin, positive when the searching color leads and `0.0`
    /// on a draw.
    pub fn simulate<S: GameState>(&mut self, node: &SearchNodeRef<S>) -> f64{
        let (state, color) = {
            let current = node.borrow();
            (current.get().state.clone(), current.get().color)
        };

        let board = self.rollout(&state, color);
        self.outcome_reward(&board)
    }

    /// Maps the winner of `board` to a reward for the searching color.
    pub fn outcome_reward<S: GameState>(&self, board: &S) -> f64{
        let (winner, margin) = board.winner();

        let reward = match winner {
            Winner::Draw => 0.0,
            Winner::White => margin,
            Winner::Black => -margin
        };

        if self.config.color == Color::Black { -reward } else { reward }
    }

    /// Propagates `reward` from `node` up to the root.
    ///
    /// Every node of the path gets one more visit. A node whose parent is
    /// moved by the searching color adds the reward, any other node subtracts
    /// it, and the root always subtracts it. The mean reward of a child is
    /// thus the value of that move for the color choosing it.
    pub fn backpropagate<S: GameState>(&self, node: &SearchNodeRef<S>, reward: f64){
        let mut current = Some(Rc::clone(node));

        while let Some(node_ref) = current {
            let parent = node_ref.borrow().get_parent();

            {
                let mut node = node_ref.borrow_mut();
                let data = node.get_mut();
                data.visits += 1;

                match &parent {
                    None => data.reward -= reward,
                    Some(parent) if parent.borrow().get().color == self.config.color => data.reward += reward,
                    Some(_) => data.reward -= reward
                }
            }

            current = parent;
        }
    }

    /// Runs `max_times` iterations from `root`, then picks the root child
    /// with the best mean reward.
    pub fn search<S: GameState>(&mut self, root: &SearchNodeRef<S>) -> SearchResult<S::Action>{
        debug!("searching {} iterations for {:?}", self.config.max_times, self.config.color);

        for _ in 0..self.config.max_times {
            let node = self.select(root);
            let reward = self.simulate(&node);
            self.backpropagate(&node, reward);
        }

        let action = match self.ucb(root, 0.0) {
            Some(best) => {
                let action = best.borrow().get().action.clone();
                action
            }
            None => None
        };

        let result = SearchResult {
            action,
            root_visits: root.borrow().get().visits,
            children: Self::root_statistics(root),
            nodes: count_nodes(root)
        };

        debug!(
            "search done: {} root visits, {} nodes, best action {:?}",
            result.root_visits, result.nodes, result.action
        );

        result
    }

    fn root_statistics<S: GameState>(root: &SearchNodeRef<S>) -> Vec<ChildStats<S::Action>>{
        let root = root.borrow();

        let children = root.children()
            .iter()
            .filter_map(|child_ref| {
                let child = child_ref.borrow();
                let data = child.get();

                let stats = data.action.clone().map(|action| ChildStats {
                    action,
                    visits: data.visits,
                    reward: data.reward,
                    mean: data.mean()
                });
                stats
            })
            .collect();
        children
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{approx_eq, GameTest};

    use super::*;

    fn engine(color: Color) -> Mcts {
        Mcts::from_config(&MctsConfig::for_color(color).with_seed(42)).unwrap()
    }

    fn root(game: GameTest, color: Color) -> SearchNodeRef<GameTest> {
        Node::new_root(SearchData::new(game, color, None))
    }

    fn set_stats(node: &SearchNodeRef<GameTest>, visits: u32, reward: f64) {
        let mut node = node.borrow_mut();
        node.get_mut().visits = visits;
        node.get_mut().reward = reward;
    }

    fn stats(node: &SearchNodeRef<GameTest>) -> (u32, f64) {
        let node = node.borrow();
        (node.get().visits, node.get().reward)
    }

    #[test]
    fn test_add_child() {
        let root = root(GameTest::new(4, 3), Color::Black);
        let mut state = GameTest::new(4, 3);
        state.apply_move(&2, Color::Black);

        let child = SearchNode::add_child(&root, state, 2, Color::White);
        let child = child.borrow();

        assert_eq!(child.get().action, Some(2));
        assert_eq!(child.get().color, Color::White);
        assert_eq!(child.get().visits, 0);
        assert_eq!(child.get().reward, 0.0);
        assert_eq!(root.borrow().len(), 1);
    }

    #[test]
    fn test_expansion_exhaustive() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(4, 3), Color::Black);

        for k in 1..=4 {
            let child = mcts.expand(&root).unwrap();
            assert_eq!(child.borrow().get().color, Color::White);
            assert_eq!(root.borrow().len(), k);
            assert_eq!(root.borrow().fully_expanded(), k == 4);
        }

        let mut actions: Vec<usize> = root.borrow()
            .children()
            .iter()
            .map(|child| child.borrow().get().action.unwrap())
            .collect();
        actions.sort();
        assert_eq!(actions, vec![0, 1, 2, 3]);

        // Nothing left to try: falls back to the (absent) parent.
        assert!(mcts.expand(&root).is_none());
        assert_eq!(root.borrow().len(), 4);
    }

    #[test]
    fn test_expansion_copies_state() {
        let mut mcts = engine(Color::White);
        let root = root(GameTest::new(4, 3), Color::White);

        let child = mcts.expand(&root).unwrap();
        let action = child.borrow().get().action.unwrap();

        assert!(root.borrow().get().state.played().is_empty());
        assert_eq!(child.borrow().get().state.played(), &[(action, Color::White)]);
    }

    #[test]
    fn test_expansion_without_moves_returns_parent() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(3, 3).with_blocked(Color::White), Color::Black);

        let child = mcts.expand(&root).unwrap();
        let fallback = mcts.expand(&child).unwrap();

        assert!(Rc::ptr_eq(&fallback, &root));
        assert!(child.borrow().fully_expanded());
        assert!(child.borrow().is_leaf());
    }

    #[test]
    fn test_select_terminal() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(4, 0), Color::Black);

        assert!(root.borrow().get().state.is_end());

        let selected = mcts.select(&root);
        assert!(Rc::ptr_eq(&selected, &root));
        assert!(root.borrow().is_leaf());
    }

    #[test]
    fn test_select_expands_leaf() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(4, 3), Color::Black);

        let selected = mcts.select(&root);

        assert_eq!(root.borrow().len(), 1);
        assert!(Rc::ptr_eq(&selected, &root.borrow().children()[0]));
    }

    #[test]
    fn test_select_always_expands_with_probability_one() {
        let config = MctsConfig::for_color(Color::Black).with_seed(3).with_expand_probability(1.0);
        let mut mcts = Mcts::from_config(&config).unwrap();
        let root = root(GameTest::new(4, 3), Color::Black);

        for k in 1..=4 {
            let selected = mcts.select(&root);
            mcts.backpropagate(&selected, 0.0);
            assert_eq!(root.borrow().len(), k);
        }
    }

    #[test]
    fn test_select_never_expands_with_probability_zero() {
        let config = MctsConfig::for_color(Color::Black).with_seed(3).with_expand_probability(0.0);
        let mut mcts = Mcts::from_config(&config).unwrap();
        let root = root(GameTest::new(4, 3), Color::Black);

        for _ in 0..5 {
            let selected = mcts.select(&root);
            mcts.backpropagate(&selected, 0.0);
        }

        // Only the initial leaf expansion happens at the root, later passes descend.
        assert_eq!(root.borrow().len(), 1);
    }

    #[test]
    fn test_select_pass_at_root_stays_on_root() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(3, 3).with_blocked(Color::Black), Color::Black);

        assert!(!root.borrow().get().state.is_end());

        let selected = mcts.select(&root);
        assert!(Rc::ptr_eq(&selected, &root));
        assert!(root.borrow().is_leaf());
    }

    #[test]
    fn test_ucb_unvisited_first() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(4, 3), Color::Black);

        for _ in 0..3 {
            mcts.expand(&root);
        }

        let visited = Rc::clone(&root.borrow().children()[1]);
        set_stats(&visited, 10, 100.0);
        set_stats(&root, 10, -100.0);

        for scalar in [0.0, 2.0, 100.0] {
            for _ in 0..20 {
                let chosen = mcts.ucb(&root, scalar).unwrap();
                assert_eq!(chosen.borrow().get().visits, 0);
                assert!(!Rc::ptr_eq(&chosen, &visited));
            }
        }
    }

    #[test]
    fn test_ucb_scores() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(3, 3), Color::Black);

        for _ in 0..3 {
            mcts.expand(&root);
        }

        let children: Vec<_> = root.borrow().children().to_vec();
        set_stats(&children[0], 2, 4.0);
        set_stats(&children[1], 1, 1.0);
        set_stats(&children[2], 4, -4.0);
        set_stats(&root, 7, 0.0);

        for _ in 0..10 {
            // Exploitation only: the best mean wins.
            assert!(Rc::ptr_eq(&mcts.ucb(&root, 0.0).unwrap(), &children[0]));
            // With exploration the least visited child overtakes it.
            assert!(Rc::ptr_eq(&mcts.ucb(&root, 2.0).unwrap(), &children[1]));
        }
    }

    #[test]
    fn test_ucb_ties_are_random() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(2, 2), Color::Black);

        mcts.expand(&root);
        mcts.expand(&root);

        let children: Vec<_> = root.borrow().children().to_vec();
        set_stats(&children[0], 3, 3.0);
        set_stats(&children[1], 3, 3.0);
        set_stats(&root, 6, 0.0);

        let mut seen = [false; 2];
        for _ in 0..100 {
            let chosen = mcts.ucb(&root, 0.0).unwrap();
            let index = children.iter().position(|child| Rc::ptr_eq(child, &chosen)).unwrap();
            seen[index] = true;
        }

        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_ucb_without_children_returns_parent() {
        let mut mcts = engine(Color::Black);
        let root = root(GameTest::new(2, 2), Color::Black);

        assert!(mcts.ucb(&root, 2.0).is_none());

        let child = mcts.expand(&root).unwrap();
        let parent = mcts.ucb(&child, 0.0).unwrap();
        assert!(Rc::ptr_eq(&parent, &root));
    }

    /// root (Black) -> child (White) -> grandchild (Black), plus a sibling of child.
    fn small_tree() -> [SearchNodeRef<GameTest>; 4] {
        let root = root(GameTest::new(4, 4), Color::Black);
        let child = SearchNode::add_child(&root, GameTest::new(4, 4), 0, Color::White);
        let sibling = SearchNode::add_child(&root, GameTest::new(4, 4), 1, Color::White);
        let grandchild = SearchNode::add_child(&child, GameTest::new(4, 4), 2, Color::Black);

        [root, child, sibling, grandchild]
    }

    #[test]
    fn test_backpropagation_visits() {
        let mcts = engine(Color::Black);
        let [root, child, sibling, grandchild] = small_tree();

        mcts.backpropagate(&grandchild, 1.0);
        mcts.backpropagate(&child, 1.0);

        assert_eq!(stats(&root).0, 2);
        assert_eq!(stats(&child).0, 2);
        assert_eq!(stats(&grandchild).0, 1);
        assert_eq!(stats(&sibling), (0, 0.0));
    }

    #[test]
    fn test_backpropagation_signs_black() {
        let mcts = engine(Color::Black);
        let [root, child, _, grandchild] = small_tree();

        mcts.backpropagate(&grandchild, 3.0);

        assert_eq!(stats(&root), (1, -3.0));
        // Parent moved by the searching color.
        assert_eq!(stats(&child), (1, 3.0));
        // Parent moved by the opponent.
        assert_eq!(stats(&grandchild), (1, -3.0));
    }

    #[test]
    fn test_backpropagation_signs_white() {
        let mcts = engine(Color::White);
        let [root, child, _, grandchild] = small_tree();

        mcts.backpropagate(&grandchild, 3.0);

        assert_eq!(stats(&root), (1, -3.0));
        assert_eq!(stats(&child), (1, -3.0));
        assert_eq!(stats(&grandchild), (1, 3.0));
    }

    #[test]
    fn test_rollout_limit() {
        let mut mcts = engine(Color::Black);
        let board = mcts.rollout(&GameTest::new(100, 100), Color::Black);
        assert_eq!(board.played().len(), 64);

        let config = MctsConfig::for_color(Color::Black).with_seed(1).with_rollout_limit(10);
        let mut mcts = Mcts::from_config(&config).unwrap();
        let board = mcts.rollout(&GameTest::new(100, 100), Color::White);
        assert_eq!(board.played().len(), 10);
        assert_eq!(board.played()[0].1, Color::White);
        assert_eq!(board.played()[1].1, Color::Black);
    }

    #[test]
    fn test_rollout_stops_at_end() {
        let mut mcts = engine(Color::Black);
        let board = mcts.rollout(&GameTest::new(5, 3), Color::Black);

        assert!(board.is_end());
        assert_eq!(board.played().len(), 3);
    }

    #[test]
    fn test_rollout_with_passes() {
        let mut mcts = engine(Color::Black);
        let board = mcts.rollout(&GameTest::new(10, 10).with_blocked(Color::White), Color::White);

        assert!(board.is_end());
        assert_eq!(board.played().len(), 10);
        assert!(board.played().iter().all(|(_, color)| *color == Color::Black));
    }

    #[test]
    fn test_rollout_does_not_touch_input() {
        let mut mcts = engine(Color::Black);
        let state = GameTest::new(6, 6);

        mcts.rollout(&state, Color::Black);
        assert!(state.played().is_empty());
    }

    #[test]
    fn test_outcome_reward() {
        let mut black_wins = GameTest::new(4, 1);
        black_wins.apply_move(&3, Color::Black);

        let mut white_wins = GameTest::new(4, 1);
        white_wins.apply_move(&1, Color::White);

        let draw = GameTest::new(4, 0);

        let black = engine(Color::Black);
        assert_eq!(black.outcome_reward(&black_wins), 4.0);
        assert_eq!(black.outcome_reward(&white_wins), -2.0);
        assert_eq!(black.outcome_reward(&draw), 0.0);

        let white = engine(Color::White);
        assert_eq!(white.outcome_reward(&black_wins), -4.0);
        assert_eq!(white.outcome_reward(&white_wins), 2.0);
        assert_eq!(white.outcome_reward(&draw), 0.0);
    }

    #[test]
    fn test_simulate_is_finite() {
        let mut mcts = engine(Color::White);
        let root = root(GameTest::new(64, 64), Color::White);

        for _ in 0..20 {
            let reward = mcts.simulate(&root);
            assert!(reward.is_finite());
        }
        assert!(root.borrow().get().state.played().is_empty());
    }

    #[test]
    fn test_search_visits_root() {
        let config = MctsConfig::for_color(Color::Black).with_seed(5).with_max_times(50);
        let mut mcts = Mcts::from_config(&config).unwrap();
        let game = GameTest::new(3, 3);
        let legal = game.legal_actions(Color::Black);
        let root = root(game, Color::Black);

        let result = mcts.search(&root);

        assert!(legal.contains(&result.action.unwrap()));
        assert_eq!(result.root_visits, 50);
        assert_eq!(root.borrow().get().visits, 50);
        assert_eq!(result.nodes, count_nodes(&root));

        let child_visits: u32 = result.children.iter().map(|child| child.visits).sum();
        assert!(child_visits <= 50);
        for child in &result.children {
            assert!(approx_eq(child.mean, child.reward / child.visits as f64));
        }
    }

    #[test]
    fn test_search_prefers_larger_margin() {
        for color in [Color::Black, Color::White] {
            let config = MctsConfig::for_color(color).with_seed(9).with_max_times(50);
            let mut mcts = Mcts::from_config(&config).unwrap();
            let root = root(GameTest::new(2, 1), color);

            let result = mcts.search(&root);

            assert_eq!(result.action, Some(1));
            assert_eq!(result.children.len(), 2);
        }
    }

    #[test]
    fn test_search_two_plies() {
        let config = MctsConfig::for_color(Color::Black).with_seed(21);
        let mut mcts = Mcts::from_config(&config).unwrap();
        let root = root(GameTest::new(3, 2), Color::Black);

        let result = mcts.search(&root);

        assert_eq!(result.action, Some(2));
        assert_eq!(result.root_visits, 250);
    }

    #[test]
    fn test_seeded_search_is_reproducible() {
        let config = MctsConfig::for_color(Color::White).with_seed(77).with_max_times(100);

        let first = Mcts::from_config(&config).unwrap().search(&root(GameTest::new(6, 4), Color::White));
        let second = Mcts::from_config(&config).unwrap().search(&root(GameTest::new(6, 4), Color::White));

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config() {
        let base = MctsConfig::DEFAULT;

        assert!(base.validate().is_ok());
        assert!(matches!(base.clone().with_max_times(0).validate(), Err(MctsError::InvalidConfig(_))));
        assert!(matches!(base.clone().with_exploration(-1.0).validate(), Err(MctsError::InvalidConfig(_))));
        assert!(matches!(base.clone().with_exploration(f64::NAN).validate(), Err(MctsError::InvalidConfig(_))));
        assert!(matches!(base.clone().with_expand_probability(1.5).validate(), Err(MctsError::InvalidConfig(_))));
        assert!(Mcts::from_config(&base.with_max_times(0)).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();

        assert_eq!(config.color, Color::Black);
        assert_eq!(config.max_times, 250);
        assert!(approx_eq(config.exploration, 2.0));
        assert!(approx_eq(config.expand_probability, 0.8));
        assert_eq!(config.rollout_limit, 64);
        assert_eq!(config.seed, None);
    }
}
