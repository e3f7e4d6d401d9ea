//! A Rust library choosing moves for an automated player of Othello/Reversi
//! style games with Monte Carlo Tree Search (MCTS).
//!
//! The search is generic over the board: anything implementing [`GameState`]
//! (legal moves per color, move application, winner and margin) can be
//! searched. Every move request builds a fresh tree, runs a fixed number of
//! select, simulate, backpropagate iterations and returns the root child with
//! the best mean reward.
//!
//! # Modules
//! - `game`: Defines the colors and the game-state contract.
//! - `tree`: Implements the tree data structure used by the search.
//! - `mcts`: Provides the search engine and its configuration.
//! - `player`: Offers the automated player built on top of the engine.
//! - `utils`: Contains sampling helpers.
//! - `test_utils`: Provides a tiny game for testing the search.
//!
//! # Examples
//! ```rust
//! use othello_mcts::{AiPlayer, Color, MctsConfig, MctsError};
//! use othello_mcts::test_utils::GameTest;
//!
//! fn main() -> Result<(), MctsError> {
//!     let config = MctsConfig::for_color(Color::Black).with_max_times(50).with_seed(7);
//!     let mut player = AiPlayer::from_config(&config)?;
//!
//!     // Two cells, a single move: taking the second cell wins by 2.
//!     let board = GameTest::new(2, 1);
//!     let report = player.search_report(&board)?;
//!
//!     assert_eq!(report.action, Some(1));
//!     assert_eq!(report.root_visits, 50);
//!     Ok(())
//! }
//! ```

mod tree;
mod game;
mod mcts;
mod player;
pub mod utils;

#[doc(hidden)]
pub mod test_utils;

pub use tree::{Node, NodeRef, WeakNodeRef};
pub use game::*;
pub use mcts::*;
pub use player::*;
