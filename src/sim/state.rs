//! Health, score and the game-over latch
//!
//! Health only moves through [`GameState::apply_frame`]; once it hits zero
//! the run is over and nothing here changes again.

use serde::{Deserialize, Serialize};

use super::field::PlatformId;
use crate::tuning::HealthTuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to take control (or paused)
    Paused,
    /// Active gameplay
    Playing,
    /// Run ended
    GameOver,
}

/// Discrete events for presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Landed { fall_distance: f64, warped: bool },
    HealthConsumed { platform: PlatformId },
    WarpStarted { platform: PlatformId },
    DamageApplied { amount: f64 },
    HealthRestored { amount: f64 },
    ScoreGained { points: u64 },
    GameOver,
}

/// Per-frame facts about the body the health rules need
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthInputs {
    /// Drop recorded by this frame's landing (0 if none)
    pub fall_distance: f64,
    pub landed: bool,
    pub position_y: f64,
    pub landed_height: Option<f64>,
    /// Body origin to top of head
    pub head_height: f64,
    pub boundary_y: f64,
    /// This frame's landing consumed a Health platform
    pub health_consumed: bool,
    /// This frame's landing ended a warp
    pub just_warped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Always within `[0, 1]`
    pub health: f64,
    /// Only ever increases
    pub score: u64,
    pub game_over: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            health: 1.0,
            score: 0,
            game_over: false,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one frame of damage, healing and scoring.
    ///
    /// Ceiling contact and a fall deep enough to be certainly lethal both
    /// force the adjustment to -1. Healing only applies on a frame without
    /// damage.
    pub fn apply_frame(
        &mut self,
        inputs: &HealthInputs,
        tuning: &HealthTuning,
        events: &mut Vec<GameEvent>,
    ) {
        if self.game_over {
            return;
        }

        let mut adjustment = -fall_damage(inputs.fall_distance, tuning);

        if inputs.landed && inputs.position_y + inputs.head_height >= inputs.boundary_y {
            adjustment = -1.0;
        }
        if let Some(landed_height) = inputs.landed_height {
            let doomed = (landed_height - inputs.position_y - tuning.fall_damage_threshold)
                * tuning.fall_damage_factor
                >= tuning.auto_loss_threshold;
            if doomed {
                adjustment = -1.0;
            }
        }

        self.health = (self.health + adjustment).clamp(0.0, 1.0);
        if adjustment < 0.0 {
            events.push(GameEvent::DamageApplied {
                amount: -adjustment,
            });
        }

        if self.health == 0.0 {
            self.game_over = true;
            events.push(GameEvent::GameOver);
            log::info!("Game over with score {}", self.score);
            return;
        }

        if inputs.health_consumed && adjustment == 0.0 {
            let before = self.health;
            self.health = (self.health + tuning.health_bonus).min(1.0);
            events.push(GameEvent::HealthRestored {
                amount: self.health - before,
            });
        }

        if inputs.fall_distance > 0.0 && !inputs.just_warped {
            let points = (inputs.fall_distance * tuning.score_per_unit).round() as u64;
            if points > 0 {
                self.score += points;
                events.push(GameEvent::ScoreGained { points });
            }
        }
    }
}

/// Damage for a single landing after falling `fall_distance`
pub fn fall_damage(fall_distance: f64, tuning: &HealthTuning) -> f64 {
    (tuning.fall_damage_factor * (fall_distance - tuning.fall_damage_threshold)).max(0.0)
}

/// How close an ongoing fall is to becoming dangerous, in `[0, 1]`
pub fn fall_danger(landed_height: Option<f64>, position_y: f64, tuning: &HealthTuning) -> f64 {
    landed_height.map_or(0.0, |h| {
        ((h - position_y - tuning.fall_damage_threshold) / tuning.danger_span).clamp(0.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting_at(y: f64) -> HealthInputs {
        HealthInputs {
            landed: true,
            position_y: y,
            landed_height: Some(y),
            head_height: 2.0,
            boundary_y: y + 40.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_fall_below_threshold_is_free() {
        let mut game = GameState::new();
        let mut events = Vec::new();
        let inputs = HealthInputs {
            fall_distance: 30.0,
            ..resting_at(-30.0)
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut events);
        assert_eq!(game.health, 1.0);
        assert_eq!(game.score, 11); // round(30 * 0.35) = round(10.5)
        assert_eq!(events, vec![GameEvent::ScoreGained { points: 11 }]);
    }

    #[test]
    fn test_fall_damage_scales_past_threshold() {
        let mut game = GameState::new();
        let mut events = Vec::new();
        let inputs = HealthInputs {
            fall_distance: 50.0,
            ..resting_at(-50.0)
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut events);
        assert!((1.0 - game.health - 0.0855).abs() < 1e-9);
        assert!(matches!(events[0], GameEvent::DamageApplied { amount } if (amount - 0.0855).abs() < 1e-9));
    }

    #[test]
    fn test_ceiling_contact_kills() {
        let mut game = GameState::new();
        let mut events = Vec::new();
        let inputs = HealthInputs {
            boundary_y: 2.0,
            ..resting_at(0.0)
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut events);
        assert_eq!(game.health, 0.0);
        assert!(game.game_over);
        assert_eq!(events.last(), Some(&GameEvent::GameOver));
    }

    #[test]
    fn test_ceiling_contact_ignored_while_airborne() {
        let mut game = GameState::new();
        let inputs = HealthInputs {
            landed: false,
            boundary_y: 1.0,
            ..resting_at(0.0)
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut Vec::new());
        assert_eq!(game.health, 1.0);
    }

    #[test]
    fn test_doomed_fall_ends_run_before_landing() {
        let mut game = GameState::new();
        // (200 - 41.45) * 0.01 = 1.5855 >= 1.5
        let inputs = HealthInputs {
            landed: false,
            position_y: -200.0,
            landed_height: Some(0.0),
            head_height: 2.0,
            boundary_y: 50.0,
            ..Default::default()
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut Vec::new());
        assert!(game.game_over);
    }

    #[test]
    fn test_health_bonus_only_without_damage() {
        let tuning = HealthTuning::default();
        let mut game = GameState {
            health: 0.5,
            ..Default::default()
        };
        let mut events = Vec::new();
        let inputs = HealthInputs {
            fall_distance: 10.0,
            health_consumed: true,
            ..resting_at(-10.0)
        };
        game.apply_frame(&inputs, &tuning, &mut events);
        assert!((game.health - 0.8).abs() < 1e-12);
        assert!(matches!(events[0], GameEvent::HealthRestored { amount } if (amount - 0.3).abs() < 1e-12));

        // Same landing with damage: no bonus
        let mut game = GameState {
            health: 0.5,
            ..Default::default()
        };
        let inputs = HealthInputs {
            fall_distance: 60.0,
            health_consumed: true,
            ..resting_at(-60.0)
        };
        game.apply_frame(&inputs, &tuning, &mut Vec::new());
        assert!(game.health < 0.5);
    }

    #[test]
    fn test_health_bonus_capped() {
        let mut game = GameState {
            health: 0.9,
            ..Default::default()
        };
        let inputs = HealthInputs {
            health_consumed: true,
            ..resting_at(0.0)
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut Vec::new());
        assert_eq!(game.health, 1.0);
    }

    #[test]
    fn test_warp_landing_scores_nothing() {
        let mut game = GameState::new();
        let inputs = HealthInputs {
            fall_distance: 20.0,
            just_warped: true,
            ..resting_at(0.0)
        };
        game.apply_frame(&inputs, &HealthTuning::default(), &mut Vec::new());
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut game = GameState {
            health: 0.0,
            game_over: true,
            score: 7,
        };
        let inputs = HealthInputs {
            fall_distance: 10.0,
            health_consumed: true,
            ..resting_at(0.0)
        };
        let mut events = Vec::new();
        game.apply_frame(&inputs, &HealthTuning::default(), &mut events);
        assert_eq!(game.health, 0.0);
        assert_eq!(game.score, 7);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fall_danger_ramp() {
        let tuning = HealthTuning::default();
        assert_eq!(fall_danger(None, -500.0, &tuning), 0.0);
        assert_eq!(fall_danger(Some(0.0), -10.0, &tuning), 0.0);
        assert!((fall_danger(Some(0.0), -116.45, &tuning) - 0.5).abs() < 1e-9);
        assert_eq!(fall_danger(Some(0.0), -1000.0, &tuning), 1.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn health_stays_in_unit_interval(
                frames in proptest::collection::vec(
                    (0.0f64..150.0, any::<bool>(), any::<bool>(), -300.0f64..0.0),
                    1..100,
                )
            ) {
                let tuning = HealthTuning::default();
                let mut game = GameState::new();
                let mut was_over = false;
                for (fall, landed, consumed, y) in frames {
                    let inputs = HealthInputs {
                        fall_distance: fall,
                        landed,
                        position_y: y,
                        landed_height: Some(y + fall),
                        head_height: 2.0,
                        boundary_y: 50.0,
                        health_consumed: consumed,
                        just_warped: false,
                    };
                    game.apply_frame(&inputs, &tuning, &mut Vec::new());
                    prop_assert!((0.0..=1.0).contains(&game.health));
                    if was_over {
                        prop_assert!(game.game_over);
                        prop_assert_eq!(game.health, 0.0);
                    }
                    prop_assert_eq!(game.game_over, game.health == 0.0);
                    was_over = game.game_over;
                }
            }
        }
    }
}
