//! Module defining the game-state contract consumed by the search.

use std::fmt::Debug;

use crate::MctsError;

/// One of the two participants of the game.
///
/// `Black` is the first color and plays with the `'X'` symbol,
/// `White` is the second one and plays with `'O'`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color{
    Black,
    White
}

impl Color{
    /// Returns the color of the other participant.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::Color;
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// ```
    #[inline]
    pub fn opponent(self) -> Self{
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black
        }
    }

    /// Returns the board symbol of the color (`'X'` or `'O'`).
    #[inline]
    pub fn symbol(self) -> char{
        match self {
            Color::Black => 'X',
            Color::White => 'O'
        }
    }
}

impl TryFrom<char> for Color{
    type Error = MctsError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            'X' => Ok(Color::Black),
            'O' => Ok(Color::White),
            other => Err(MctsError::InvalidColor(other))
        }
    }
}

/// Outcome tag reported by [`GameState::winner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner{
    Black,
    White,
    Draw
}

/// Trait defining the interface a board must offer to be searched.
///
/// The search never mutates a state it was handed: every node owns its own
/// snapshot, and moves are always applied to a fresh clone. `Clone` must
/// therefore produce a fully independent copy.
pub trait GameState: Clone{
    /// Identifier of a move, e.g. a board coordinate.
    type Action: Clone + PartialEq + Debug;

    /// Returns the moves `color` may play in this state.
    ///
    /// The collection may be empty (the color has to pass). Its ordering is
    /// irrelevant to the search.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::{Color, GameState};
    /// use othello_mcts::test_utils::GameTest;
    /// let game = GameTest::new(4, 3);
    /// assert_eq!(game.legal_actions(Color::Black), vec![0, 1, 2, 3]);
    /// ```
    fn legal_actions(&self, color: Color) -> Vec<Self::Action>;

    /// Plays `action` for `color`, applying every rule-specific side effect
    /// (flips and so on) in place.
    ///
    /// The action is assumed to be legal for `color`.
    fn apply_move(&mut self, action: &Self::Action, color: Color);

    /// Reports who currently leads and by how much.
    ///
    /// This may be called on a board that is not finished (a rollout stops
    /// after a fixed number of half-moves). The margin is non-negative, e.g.
    /// the disk-count difference.
    fn winner(&self) -> (Winner, f64);

    /// Returns `true` when neither color has a legal move left.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::GameState;
    /// use othello_mcts::test_utils::GameTest;
    /// let mut game = GameTest::new(4, 1);
    /// assert!(!game.is_end());
    /// game.apply_move(&2, othello_mcts::Color::White);
    /// assert!(game.is_end());
    /// ```
    #[inline]
    fn is_end(&self) -> bool{
        self.legal_actions(Color::Black).is_empty() && self.legal_actions(Color::White).is_empty()
    }
}
