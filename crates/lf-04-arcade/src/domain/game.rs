//! # Game Record
//!
//! What one arcade store entry holds, and how a finished round is scored.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    pub fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Scissors, Hand::Paper) | (Hand::Paper, Hand::Rock)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Rock => "ROCK",
            Hand::Paper => "PAPER",
            Hand::Scissors => "SCISSORS",
        }
    }
}

impl FromStr for Hand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROCK" => Ok(Hand::Rock),
            "PAPER" => Ok(Hand::Paper),
            "SCISSORS" => Ok(Hand::Scissors),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameState {
    Open,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

/// Store value for one game, keyed by game name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    pub state: GameState,
    pub players: Vec<String>,
    #[serde(default)]
    pub hands: BTreeMap<String, Hand>,
    #[serde(default)]
    pub results: BTreeMap<String, Outcome>,
}

impl Game {
    pub fn open(players: Vec<String>) -> Self {
        Self {
            state: GameState::Open,
            players,
            hands: BTreeMap::new(),
            results: BTreeMap::new(),
        }
    }

    /// The listed player entry matching `address`, compared case-insensitively.
    pub fn player_for(&self, address: &str) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.eq_ignore_ascii_case(address))
            .map(String::as_str)
    }

    /// Record a hand; completes and scores the game once everyone has shot.
    pub fn record(&mut self, player: &str, hand: Hand) {
        self.hands.insert(player.to_string(), hand);
        if self.hands.len() == self.players.len() {
            self.results = score(&self.hands);
            self.state = GameState::Complete;
        }
    }
}

/// Exactly two distinct hands: the dominating one wins. Otherwise all tie.
pub fn score(hands: &BTreeMap<String, Hand>) -> BTreeMap<String, Outcome> {
    let distinct: BTreeSet<Hand> = hands.values().copied().collect();
    let winner = match distinct.iter().copied().collect::<Vec<_>>().as_slice() {
        [a, b] if a.beats(*b) => Some(*a),
        [a, b] if b.beats(*a) => Some(*b),
        _ => None,
    };

    hands
        .iter()
        .map(|(player, hand)| {
            let outcome = match winner {
                None => Outcome::Tie,
                Some(w) if *hand == w => Outcome::Win,
                Some(_) => Outcome::Lose,
            };
            (player.clone(), outcome)
        })
        .collect()
}
