use std::time::Duration;

use clap::Args;

use crate::{
    controls::check_speed,
    errors::HeapError,
    mode::HeapMode,
    session::{MAX_LEVELS, MIN_LEVELS},
};

/// Options shared by every command
#[derive(Debug, Clone, Args)]
pub struct CommonOptions {
    /// Number of levels in the tree (2 to 6)
    #[arg(short, long, required = false, default_value = "4")]
    pub levels: usize,

    /// Heap ordering
    #[arg(short, long, value_enum, default_value_t = HeapMode::Min)]
    pub mode: HeapMode,

    /// Animation speed factor; 2 plays twice as fast (at least 0.01)
    #[arg(short, long, required = false, default_value = "1.0")]
    pub speed: f64,

    /// Length of one animation step at speed 1, in milliseconds
    #[arg(long, required = false, default_value = "2000")]
    pub base_delay_ms: u64,

    /// Seed for the random heap values
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use these values instead of random ones
    #[arg(long, value_delimiter = ',')]
    pub values: Vec<u32>,
}

impl CommonOptions {
    pub fn check(&self) -> Result<(), HeapError> {
        if self.values.is_empty() && !(MIN_LEVELS..=MAX_LEVELS).contains(&self.levels) {
            return Err(HeapError::BadLevels(self.levels));
        }
        check_speed(self.speed)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for CommonOptions {
    fn default() -> Self {
        CommonOptions {
            levels: 4,
            mode: HeapMode::Min,
            speed: 1.0,
            base_delay_ms: 2000,
            seed: None,
            values: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(CommonOptions::default().check(), Ok(()));
        assert_eq!(
            CommonOptions::default().base_delay(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn level_range() {
        let mut options = CommonOptions::default();
        options.levels = 7;
        assert_eq!(options.check(), Err(HeapError::BadLevels(7)));
        options.levels = 1;
        assert_eq!(options.check(), Err(HeapError::BadLevels(1)));
        // explicit values make the level count irrelevant
        options.values = vec![3, 1, 2, 5];
        assert_eq!(options.check(), Ok(()));
    }

    #[test]
    fn speed_must_be_positive() {
        let mut options = CommonOptions::default();
        options.speed = 0.0;
        assert_eq!(options.check(), Err(HeapError::BadSpeed(0.0)));
        options.speed = 1e-300;
        assert_eq!(options.check(), Err(HeapError::BadSpeed(1e-300)));
    }
}
