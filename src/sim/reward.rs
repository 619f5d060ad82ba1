use crate::error::RewardError;

/// Per-turn reward constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardConfig {
    /// Penalty for trying to move into a blocked cell
    pub wall_bump: f64,
    /// Reward for consuming a collectible
    pub collect: f64,
    /// Bonus for clearing the last collectible
    pub win_bonus: f64,
    /// Penalty for sharing a cell with an adversary
    pub collision: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            wall_bump: -1.0,
            collect: 10.0,
            win_bonus: 200.0,
            collision: -100.0,
        }
    }
}

impl RewardConfig {
    /// Defaults with the collision penalty raised so it outweighs collecting
    /// all `collectibles`.
    pub fn for_collectibles(collectibles: usize) -> Self {
        let defaults = Self::default();
        let floor = defaults.collect * (collectibles as f64 + 1.0);
        Self {
            collision: defaults.collision.min(-floor),
            ..defaults
        }
    }

    pub fn validate(&self, collectibles: usize) -> Result<(), RewardError> {
        if !(self.wall_bump < 0.0 && 0.0 < self.collect && self.collect < self.win_bonus) {
            return Err(RewardError::Ordering {
                bump: self.wall_bump,
                collect: self.collect,
                win: self.win_bonus,
            });
        }

        let collectible_total = self.collect * collectibles as f64;
        if !(self.collision < 0.0 && -self.collision > collectible_total) {
            return Err(RewardError::CollisionNotDominant {
                penalty: self.collision,
                collectible_total,
            });
        }

        Ok(())
    }
}
