//! Directional sensory encoding for the tabular agent
//!
//! The agent does not see the grid. It sees four rays cast from the head
//! along the cardinal directions, each reduced to four binned distances:
//! to the nearest blocking cell (boundary or wall), to the first green
//! apple, to the first red apple, and to the first body segment.

use crate::game::{Direction, GameState, Position};

/// Binned distances observed along one cardinal ray
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RayFeatures {
    /// Distance bin to the boundary or first wall cell (always present)
    pub wall: u8,
    /// Distance bin to the first green apple, 0 if none before the wall
    pub green: u8,
    /// Distance bin to the first red apple, 0 if none before the wall
    pub red: u8,
    /// Distance bin to the first body segment, 0 if none before the wall
    pub body: u8,
}

/// One observation: ray features in the fixed order Up, Right, Down, Left
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Observation {
    pub rays: [RayFeatures; 4],
}

/// Convert a raw step distance into its coarse bin
///
/// 0 stands for "absent", 1 and 2 are exact, 3 covers 3..=5 and 4 covers
/// everything from 6 up. The same binning applies to all four channels.
pub fn bin_distance(distance: u32) -> u8 {
    match distance {
        0 => 0,
        1 => 1,
        2 => 2,
        3..=5 => 3,
        _ => 4,
    }
}

/// Produce the observation for the current game state
///
/// Walks each ray outward one cell at a time until a boundary or wall
/// cell is hit, recording the first occurrence of each feature. A snake
/// that has shrunk to nothing sees walls everywhere.
pub fn observe(state: &GameState) -> Observation {
    let mut rays = [RayFeatures::default(); 4];

    match state.snake.head() {
        Some(head) => {
            for (slot, &direction) in Direction::ALL.iter().enumerate() {
                rays[slot] = cast_ray(state, head, direction);
            }
        }
        None => {
            for ray in &mut rays {
                ray.wall = 4;
            }
        }
    }

    Observation { rays }
}

fn cast_ray(state: &GameState, head: Position, direction: Direction) -> RayFeatures {
    let mut green = 0;
    let mut red = 0;
    let mut body = 0;

    let mut pos = head;
    let mut distance = 0u32;
    loop {
        distance += 1;
        pos = pos.moved_in_direction(direction);

        if state.is_blocked(pos) {
            return RayFeatures {
                wall: bin_distance(distance),
                green: bin_distance(green),
                red: bin_distance(red),
                body: bin_distance(body),
            };
        }

        // First occurrence only
        if green == 0 && state.green_apples.contains(&pos) {
            green = distance;
        }
        if red == 0 && state.red_apples.contains(&pos) {
            red = distance;
        }
        if body == 0 && state.snake.occupies(pos) {
            body = distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Snake;
    use std::collections::HashSet;

    fn bare_state(snake: Snake) -> GameState {
        GameState::new(
            snake,
            HashSet::new(),
            HashSet::new(),
            HashSet::new(),
            10,
            10,
        )
    }

    #[test]
    fn test_bin_distance() {
        assert_eq!(bin_distance(0), 0);
        assert_eq!(bin_distance(1), 1);
        assert_eq!(bin_distance(2), 2);
        assert_eq!(bin_distance(3), 3);
        assert_eq!(bin_distance(4), 3);
        assert_eq!(bin_distance(5), 3);
        assert_eq!(bin_distance(6), 4);
        assert_eq!(bin_distance(100), 4);
    }

    #[test]
    fn test_boundary_distances() {
        // Head at (2,3): 3 cells to the top edge row, 7 to the right edge
        let state = bare_state(Snake::new(Position::new(2, 3), Direction::Up, 1));
        let obs = observe(&state);

        assert_eq!(obs.rays[Direction::Up.index()].wall, bin_distance(4));
        assert_eq!(obs.rays[Direction::Right.index()].wall, bin_distance(8));
        assert_eq!(obs.rays[Direction::Down.index()].wall, bin_distance(7));
        assert_eq!(obs.rays[Direction::Left.index()].wall, bin_distance(3));
    }

    #[test]
    fn test_apples_on_rays() {
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Up, 1));
        state.green_apples.insert(Position::new(5, 3)); // 2 up
        state.red_apples.insert(Position::new(8, 5)); // 3 right

        let obs = observe(&state);

        assert_eq!(obs.rays[Direction::Up.index()].green, 2);
        assert_eq!(obs.rays[Direction::Up.index()].red, 0);
        assert_eq!(obs.rays[Direction::Right.index()].red, 3);
        assert_eq!(obs.rays[Direction::Right.index()].green, 0);
        // Off-ray apples are invisible
        assert_eq!(obs.rays[Direction::Down.index()].green, 0);
        assert_eq!(obs.rays[Direction::Left.index()].red, 0);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut state = bare_state(Snake::new(Position::new(0, 5), Direction::Up, 1));
        state.green_apples.insert(Position::new(2, 5));
        state.green_apples.insert(Position::new(6, 5));

        let obs = observe(&state);

        assert_eq!(obs.rays[Direction::Right.index()].green, 2);
    }

    #[test]
    fn test_wall_cell_terminates_ray() {
        let mut state = bare_state(Snake::new(Position::new(0, 5), Direction::Up, 1));
        state.walls.insert(Position::new(3, 5));
        // Apple behind the wall is never seen
        state.green_apples.insert(Position::new(5, 5));

        let obs = observe(&state);

        assert_eq!(obs.rays[Direction::Right.index()].wall, 3);
        assert_eq!(obs.rays[Direction::Right.index()].green, 0);
    }

    #[test]
    fn test_body_on_ray() {
        // Head (5,5) heading Up, body trails downward at (5,6), (5,7)
        let state = bare_state(Snake::new(Position::new(5, 5), Direction::Up, 3));
        let obs = observe(&state);

        assert_eq!(obs.rays[Direction::Down.index()].body, 1);
        assert_eq!(obs.rays[Direction::Up.index()].body, 0);
        assert_eq!(obs.rays[Direction::Left.index()].body, 0);
        assert_eq!(obs.rays[Direction::Right.index()].body, 0);
    }

    #[test]
    fn test_empty_snake_sees_walls() {
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Up, 1));
        state.snake.body.clear();

        let obs = observe(&state);

        for ray in &obs.rays {
            assert_eq!(*ray, RayFeatures { wall: 4, green: 0, red: 0, body: 0 });
        }
    }
}
