//! Test utilities for the search engine

use crate::{Color, GameState, Winner};

/// A small placement game used to exercise the search.
///
/// Both colors pick distinct cells among `actions` cells, until `max_plies`
/// cells have been taken in total or no free cell remains. A color owns the
/// sum of `index + 1` of the cells it took; the larger sum wins and the
/// difference is the margin. A color listed as blocked never has a legal
/// move, which lets tests reproduce passes.
#[derive(Clone, Debug)]
pub struct GameTest {
    actions: usize,
    max_plies: usize,
    played: Vec<(usize, Color)>,
    blocked: Option<Color>,
}

impl GameTest {
    /// Creates a fresh game with `actions` cells finishing after `max_plies` moves.
    pub fn new(actions: usize, max_plies: usize) -> Self {
        GameTest {
            actions,
            max_plies,
            played: Vec::new(),
            blocked: None,
        }
    }

    /// Returns the same game where `color` can never move.
    pub fn with_blocked(mut self, color: Color) -> Self {
        self.blocked = Some(color);
        self
    }

    /// Moves played so far, in order.
    pub fn played(&self) -> &[(usize, Color)] {
        &self.played
    }

    fn score(&self, color: Color) -> usize {
        self.played
            .iter()
            .filter(|(_, owner)| *owner == color)
            .map(|(index, _)| index + 1)
            .sum()
    }
}

impl GameState for GameTest {
    type Action = usize;

    fn legal_actions(&self, color: Color) -> Vec<usize> {
        if self.played.len() >= self.max_plies || self.blocked == Some(color) {
            return Vec::new();
        }

        (0..self.actions)
            .filter(|index| !self.played.iter().any(|(played, _)| played == index))
            .collect()
    }

    fn apply_move(&mut self, action: &usize, color: Color) {
        self.played.push((*action, color));
    }

    fn winner(&self) -> (Winner, f64) {
        let black = self.score(Color::Black);
        let white = self.score(Color::White);

        if black > white {
            (Winner::Black, (black - white) as f64)
        } else if white > black {
            (Winner::White, (white - black) as f64)
        } else {
            (Winner::Draw, 0.0)
        }
    }
}

/// Utility function to compare floats with tolerance
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-8
}
