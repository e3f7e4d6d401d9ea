//! Automated player choosing its moves with the search.

use log::info;

use crate::{Color, GameState, Mcts, MctsConfig, MctsError, Node, SearchData, SearchResult};

/// A player that searches a fresh tree for every move it is asked for.
pub struct AiPlayer{
    mcts: Mcts
}

impl AiPlayer{
    /// Creates a player for `color` with the default configuration
    /// (250 iterations, exploration scalar 2).
    #[inline]
    pub fn new(color: Color) -> Self{
        AiPlayer { mcts: Mcts::new(color) }
    }

    /// Creates a player from a specified configuration.
    ///
    /// # Returns
    /// `Err(MctsError::InvalidConfig(_))` if the configuration does not validate.
    pub fn from_config(config: &MctsConfig) -> Result<Self, MctsError>{
        Ok(AiPlayer { mcts: Mcts::from_config(config)? })
    }

    /// The color this player moves for.
    #[inline]
    pub fn color(&self) -> Color{
        self.mcts.config().color
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig{
        self.mcts.config()
    }

    /// Returns the move to play on `board`.
    ///
    /// # Returns
    /// `Err(MctsError::NoLegalActions(_))` when the player has to pass.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::{AiPlayer, Color, GameState, MctsConfig, MctsError};
    /// use othello_mcts::test_utils::GameTest;
    ///
    /// fn main() -> Result<(), MctsError> {
    ///     let config = MctsConfig::for_color(Color::White).with_max_times(100).with_seed(1);
    ///     let mut player = AiPlayer::from_config(&config)?;
    ///
    ///     let board = GameTest::new(4, 2);
    ///     let action = player.get_move(&board)?;
    ///     assert!(board.legal_actions(Color::White).contains(&action));
    ///     Ok(())
    /// }
    /// ```
    pub fn get_move<S: GameState>(&mut self, board: &S) -> Result<S::Action, MctsError>{
        let result = self.search_report(board)?;
        result.action.ok_or(MctsError::NoLegalActions(self.color()))
    }

    /// Runs the whole search on `board` and returns its statistics.
    pub fn search_report<S: GameState>(&mut self, board: &S) -> Result<SearchResult<S::Action>, MctsError>{
        let color = self.color();

        if board.legal_actions(color).is_empty() {
            return Err(MctsError::NoLegalActions(color));
        }

        info!("{} ({:?}) is thinking", color.symbol(), color);

        let root = Node::new_root(SearchData::new(board.clone(), color, None));
        Ok(self.mcts.search(&root))
    }
}
