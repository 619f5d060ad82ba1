//! Abstract action space - the two high-level intents the agent chooses between

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Intent {
    /// Head for the nearest remaining collectible
    SeekReward = 0,
    /// Head for the cell farthest from every adversary
    AvoidThreat = 1,
}

impl Intent {
    pub const COUNT: usize = 2;
    pub const ALL: [Intent; Intent::COUNT] = [Intent::SeekReward, Intent::AvoidThreat];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::SeekReward => f.write_str("seek"),
            Intent::AvoidThreat => f.write_str("avoid"),
        }
    }
}
