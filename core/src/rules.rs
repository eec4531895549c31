// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game rule declarations carried by a game record's root node

use serde::{Deserialize, Serialize};

/// Scoring ruleset named by the server. Only used as an opaque label here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    /// Territory scoring
    #[default]
    Japanese,
    /// Area scoring
    Chinese,
    /// American Go Association rules
    Aga,
    /// New Zealand rules
    NewZealand,
}

/// Clock scheme for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSystem {
    /// No clock
    #[default]
    None,
    /// Main time only
    Absolute,
    /// Main time followed by fixed overtime periods
    ByoYomi,
    /// Main time followed by stone-count overtime blocks
    Canadian,
}

/// A `RULES` property: board size, ruleset and time control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRules {
    /// Board side length
    #[serde(default = "default_size")]
    pub size: u8,
    /// Ruleset label
    #[serde(default)]
    pub rules: Ruleset,
    /// Time control scheme
    #[serde(default)]
    pub time_system: TimeSystem,
    /// Main time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_time: Option<f64>,
    /// Length of one overtime period in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byo_yomi_time: Option<f64>,
    /// Number of byo-yomi periods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byo_yomi_periods: Option<u32>,
    /// Stones per Canadian overtime block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byo_yomi_stones: Option<u32>,
    /// Points given to white
    #[serde(default)]
    pub komi: f64,
    /// Handicap stones
    #[serde(default)]
    pub handicap: u32,
}

fn default_size() -> u8 {
    19
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            size: default_size(),
            rules: Ruleset::default(),
            time_system: TimeSystem::default(),
            main_time: None,
            byo_yomi_time: None,
            byo_yomi_periods: None,
            byo_yomi_stones: None,
            komi: 0.0,
            handicap: 0,
        }
    }
}

impl GameRules {
    /// Seconds on each clock when the game starts, if the game is timed
    pub fn starting_time(&self) -> Option<f64> {
        match self.time_system {
            TimeSystem::None => None,
            _ => self.main_time,
        }
    }
}
