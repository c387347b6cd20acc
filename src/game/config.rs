use serde::{Deserialize, Serialize};

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Number of green apples on the board (grow +1)
    pub green_apples: usize,
    /// Number of red apples on the board (shrink -1)
    pub red_apples: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            initial_snake_length: 3,
            green_apples: 2,
            red_apples: 1,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 3 || self.grid_height < 3 {
            return Err(format!(
                "grid must be at least 3x3, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        if self.initial_snake_length > self.grid_width.max(self.grid_height) {
            return Err(format!(
                "initial_snake_length ({}) does not fit a {}x{} grid",
                self.initial_snake_length, self.grid_width, self.grid_height
            ));
        }

        let cells = self.grid_width * self.grid_height;
        if self.initial_snake_length + self.green_apples + self.red_apples > cells {
            return Err(format!(
                "snake and apples do not fit {} cells",
                cells
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 10);
        assert_eq!(config.grid_height, 10);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.green_apples, 2);
        assert_eq!(config.red_apples, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_tiny_grid() {
        let config = GameConfig::new(2, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_snake_too_long() {
        let mut config = GameConfig::new(5, 5);
        config.initial_snake_length = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_length_snake() {
        let mut config = GameConfig::default();
        config.initial_snake_length = 0;
        assert!(config.validate().is_err());
    }
}
