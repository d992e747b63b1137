//! Survival-mode rock/paper/scissors rules.
//!
//! Consumes confirmed gestures. A match runs until the computer wins a round.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::classifier::Gesture;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// `None` for the non-playable label.
    pub fn from_gesture(gesture: Gesture) -> Option<Move> {
        match gesture {
            Gesture::Rock => Some(Move::Rock),
            Gesture::Paper => Some(Move::Paper),
            Gesture::Scissors => Some(Move::Scissors),
            Gesture::None => None,
        }
    }

    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors) | (Move::Scissors, Move::Paper) | (Move::Paper, Move::Rock)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
    PlayerWin,
    CpuWin,
    Draw,
}

pub fn determine_winner(player: Move, cpu: Move) -> RoundResult {
    if player.beats(cpu) {
        RoundResult::PlayerWin
    } else if cpu.beats(player) {
        RoundResult::CpuWin
    } else {
        RoundResult::Draw
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Round {
    pub player: Move,
    pub cpu: Move,
    pub result: RoundResult,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GameStats {
    pub rounds_played: usize,
    pub player_wins: usize,
    pub cpu_wins: usize,
    pub draws: usize,
    pub win_rate: f64,
}

pub struct GameLogic {
    rng: StdRng,
    history: Vec<Round>,
}

impl GameLogic {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic computer moves.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            history: Vec::new(),
        }
    }

    pub fn cpu_move(&mut self) -> Move {
        Move::ALL[self.rng.gen_range(0..Move::ALL.len())]
    }

    /// Play against a random computer move.
    pub fn play_round(&mut self, player: Move) -> Round {
        let cpu = self.cpu_move();
        self.play_round_against(player, cpu)
    }

    pub fn play_round_against(&mut self, player: Move, cpu: Move) -> Round {
        let round = Round {
            player,
            cpu,
            result: determine_winner(player, cpu),
        };
        log::info!(
            "round {}: player {} vs cpu {} -> {:?}",
            self.history.len() + 1,
            player,
            cpu,
            round.result
        );
        self.history.push(round);
        round
    }

    /// The match ends on the first computer win.
    pub fn is_game_over(&self) -> bool {
        self.count(RoundResult::CpuWin) > 0
    }

    /// Player wins since the last draw or loss.
    pub fn win_streak(&self) -> usize {
        self.history
            .iter()
            .rev()
            .take_while(|round| round.result == RoundResult::PlayerWin)
            .count()
    }

    /// (player, cpu) round wins.
    pub fn score(&self) -> (usize, usize) {
        (self.count(RoundResult::PlayerWin), self.count(RoundResult::CpuWin))
    }

    pub fn history(&self) -> &[Round] {
        &self.history
    }

    pub fn stats(&self) -> GameStats {
        let rounds_played = self.history.len();
        let player_wins = self.count(RoundResult::PlayerWin);
        GameStats {
            rounds_played,
            player_wins,
            cpu_wins: self.count(RoundResult::CpuWin),
            draws: self.count(RoundResult::Draw),
            win_rate: if rounds_played == 0 {
                0.0
            } else {
                player_wins as f64 / rounds_played as f64
            },
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    fn count(&self, result: RoundResult) -> usize {
        self.history.iter().filter(|r| r.result == result).count()
    }
}

impl Default for GameLogic {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_cyclic() {
        for player in Move::ALL {
            let wins = Move::ALL.iter().filter(|&&cpu| player.beats(cpu)).count();
            assert_eq!(wins, 1);
            assert_eq!(determine_winner(player, player), RoundResult::Draw);
        }
        assert_eq!(determine_winner(Move::Rock, Move::Scissors), RoundResult::PlayerWin);
        assert_eq!(determine_winner(Move::Rock, Move::Paper), RoundResult::CpuWin);
    }

    #[test]
    fn only_playable_gestures_map_to_moves() {
        assert_eq!(Move::from_gesture(Gesture::Paper), Some(Move::Paper));
        assert_eq!(Move::from_gesture(Gesture::None), None);
    }

    #[test]
    fn survival_ends_on_first_loss() {
        let mut game = GameLogic::seeded(1);
        game.play_round_against(Move::Rock, Move::Scissors);
        game.play_round_against(Move::Paper, Move::Rock);
        assert_eq!(game.win_streak(), 2);
        game.play_round_against(Move::Paper, Move::Paper);
        assert_eq!(game.win_streak(), 0);
        assert!(!game.is_game_over());
        game.play_round_against(Move::Scissors, Move::Rock);
        assert!(game.is_game_over());

        let stats = game.stats();
        assert_eq!(stats.rounds_played, 4);
        assert_eq!((stats.player_wins, stats.cpu_wins, stats.draws), (2, 1, 1));
        assert!((stats.win_rate - 0.5).abs() < 1e-9);
        assert_eq!(game.score(), (2, 1));

        game.reset();
        assert_eq!(game.stats(), GameStats::default());
    }

    #[test]
    fn seeded_cpu_is_reproducible() {
        let mut a = GameLogic::seeded(7);
        let mut b = GameLogic::seeded(7);
        let moves_a: Vec<Move> = (0..20).map(|_| a.cpu_move()).collect();
        let moves_b: Vec<Move> = (0..20).map(|_| b.cpu_move()).collect();
        assert_eq!(moves_a, moves_b);
    }
}
