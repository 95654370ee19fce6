use crate::env::{Heading, Waypoint};

/// Intersection coordinates, `(x, y)` with `y` growing southward
pub type Pos = (i32, i32);

/// Unit direction of travel, `(dx, dy)`
pub type Dir = (i32, i32);

pub const NORTH: Dir = (0, -1);
pub const EAST: Dir = (1, 0);
pub const SOUTH: Dir = (0, 1);
pub const WEST: Dir = (-1, 0);

/// Direction after turning left from `dir`
pub const fn turn_left(dir: Dir) -> Dir {
    (dir.1, -dir.0)
}

/// Direction after turning right from `dir`
pub const fn turn_right(dir: Dir) -> Dir {
    (-dir.1, dir.0)
}

/// Suggests the next heading toward a destination, ignoring traffic rules
///
/// The east-west offset is closed first, then the north-south one. Driving away from
/// the destination yields a `Right`, starting a long U-turn around the block.
#[derive(Debug, Clone, Default)]
pub struct RoutePlanner {
    destination: Option<Pos>,
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_to(&mut self, destination: Pos) {
        self.destination = Some(destination);
    }

    pub fn destination(&self) -> Option<Pos> {
        self.destination
    }

    pub fn next_waypoint(&self, location: Pos, heading: Dir) -> Waypoint {
        let Some(destination) = self.destination else {
            return Heading::None;
        };
        let (dx, dy) = (destination.0 - location.0, destination.1 - location.1);

        if dx != 0 {
            if dx * heading.0 > 0 {
                Heading::Forward
            } else if dx * heading.0 < 0 {
                Heading::Right
            } else if dx * heading.1 > 0 {
                Heading::Left
            } else {
                Heading::Right
            }
        } else if dy != 0 {
            if dy * heading.1 > 0 {
                Heading::Forward
            } else if dy * heading.1 < 0 {
                Heading::Right
            } else if dy * heading.0 > 0 {
                Heading::Right
            } else {
                Heading::Left
            }
        } else {
            Heading::None
        }
    }
}
