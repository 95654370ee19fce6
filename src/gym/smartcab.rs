use log::warn;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use strum::VariantArray;

use crate::{
    env::{Action, Environment, Heading, Light, Percept, Waypoint},
    error::{Error, Result},
};

use super::planner::{turn_left, turn_right, Dir, Pos, RoutePlanner, EAST, NORTH, SOUTH, WEST};

const HEADINGS: [Dir; 4] = [EAST, NORTH, WEST, SOUTH];
const LIGHT_PERIODS: [u32; 3] = [3, 4, 5];

/// Minimum Manhattan distance between a trial's start and destination
const MIN_ROUTE: i32 = 4;

/// Configuration for the [`Smartcab`] world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Number of intersections along the east-west and north-south axes
    ///
    /// **Default**: `(8, 6)`
    pub grid_size: (i32, i32),
    /// Number of randomly wandering cars sharing the roads
    ///
    /// **Default**: `3`
    pub dummies: usize,
    /// Time steps granted per unit of distance between start and destination
    ///
    /// **Default**: `5`
    pub deadline_factor: i32,
    /// Deadline at which a trial always ends, even if deadlines are not enforced
    ///
    /// **Default**: `-100`
    pub hard_time_limit: i32,
    /// End the trial once the deadline runs out
    ///
    /// **Default**: `true`
    pub enforce_deadline: bool,
    /// Seed of the world's random source, drawn from the OS if `None`
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: (8, 6),
            dummies: 3,
            deadline_factor: 5,
            hard_time_limit: -100,
            enforce_deadline: true,
            seed: None,
        }
    }
}

/// A traffic light that alternately opens the north-south and the east-west axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    /// `true` while north-south traffic has the green light
    pub north_south: bool,
    period: u32,
    last_updated: u32,
}

impl TrafficLight {
    fn new(rng: &mut impl Rng) -> Self {
        Self {
            north_south: rng.gen(),
            period: *LIGHT_PERIODS.choose(rng).unwrap_or(&LIGHT_PERIODS[0]),
            last_updated: 0,
        }
    }

    fn reset(&mut self, rng: &mut impl Rng) {
        self.north_south = rng.gen();
        self.last_updated = 0;
    }

    fn update(&mut self, t: u32) {
        if t - self.last_updated >= self.period {
            self.north_south = !self.north_south;
            self.last_updated = t;
        }
    }

    /// Light color seen by a car travelling along `heading`
    pub fn color(&self, heading: Dir) -> Light {
        let vertical = heading.1 != 0;
        if vertical == self.north_south {
            Light::Green
        } else {
            Light::Red
        }
    }
}

/// A car on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Car {
    pub location: Pos,
    pub heading: Dir,
    /// The heading the car means to take at its current intersection
    pub intent: Waypoint,
}

/// Everything needed to draw the world at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub grid_size: (i32, i32),
    pub t: u32,
    pub destination: Pos,
    pub deadline: i32,
    /// The learning car comes first
    pub cars: Vec<Car>,
    /// North-south state of every intersection light, row by row
    pub lights: Vec<bool>,
}

/// Grid-world traffic simulation with one learning car and a few wandering ones
///
/// Intersections sit on a torus: driving off one edge re-enters on the opposite side.
/// The learning car is scored on each move, rewarded for following its route planner
/// and penalized for breaking right-of-way rules.
pub struct Smartcab {
    config: WorldConfig,
    rng: StdRng,
    lights: Vec<TrafficLight>,
    /// Index 0 is the learning car
    cars: Vec<Car>,
    planner: RoutePlanner,
    destination: Pos,
    deadline: i32,
    t: u32,
    done: bool,
    reached: bool,
}

impl Smartcab {
    /// **Errors** with [`Error::InvalidWorld`] if the grid is too small for a route of the minimum length
    pub fn new(config: WorldConfig) -> Result<Self> {
        let (w, h) = config.grid_size;
        if w < 1 || h < 1 || (w - 1) + (h - 1) < MIN_ROUTE {
            return Err(Error::InvalidWorld(format!(
                "a {w}x{h} grid has no routes of length {MIN_ROUTE}"
            )));
        }
        if config.deadline_factor < 1 {
            return Err(Error::InvalidWorld(format!(
                "deadline factor must be positive, got {}",
                config.deadline_factor
            )));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let lights = (0..w * h).map(|_| TrafficLight::new(&mut rng)).collect();
        let parked = Car {
            location: (1, 1),
            heading: EAST,
            intent: Heading::None,
        };

        let mut world = Self {
            cars: vec![parked; config.dummies + 1],
            config,
            rng,
            lights,
            planner: RoutePlanner::new(),
            destination: (1, 1),
            deadline: 0,
            t: 0,
            done: false,
            reached: false,
        };
        world.reset();
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Current time step of the trial
    pub fn t(&self) -> u32 {
        self.t
    }

    pub fn destination(&self) -> Pos {
        self.destination
    }

    pub fn primary(&self) -> &Car {
        &self.cars[0]
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid_size: self.config.grid_size,
            t: self.t,
            destination: self.destination,
            deadline: self.deadline,
            cars: self.cars.clone(),
            lights: self.lights.iter().map(|l| l.north_south).collect(),
        }
    }

    fn light_at(&self, location: Pos) -> &TrafficLight {
        let (w, _) = self.config.grid_size;
        let index = (location.1 - 1) * w + (location.0 - 1);
        &self.lights[index as usize]
    }

    fn random_location(&mut self) -> Pos {
        let (w, h) = self.config.grid_size;
        (self.rng.gen_range(1..=w), self.rng.gen_range(1..=h))
    }

    fn random_heading(&mut self) -> Dir {
        HEADINGS[self.rng.gen_range(0..HEADINGS.len())]
    }

    fn random_intent(&mut self) -> Waypoint {
        // Wandering cars never plan to wait
        Heading::VARIANTS[self.rng.gen_range(1..Heading::VARIANTS.len())]
    }

    /// Sensor readings of the car at `index`
    fn sense_for(&self, index: usize) -> Percept {
        let car = &self.cars[index];
        let heading = car.heading;
        let mut percept = Percept {
            light: self.light_at(car.location).color(heading),
            ..Percept::clear()
        };

        for (i, other) in self.cars.iter().enumerate() {
            if i == index || other.location != car.location || other.heading == heading {
                continue;
            }
            let intent = other.intent;
            if heading.0 * other.heading.0 + heading.1 * other.heading.1 == -1 {
                // An oncoming left turn is never masked by another oncoming car
                if percept.oncoming != Heading::Left {
                    percept.oncoming = intent;
                }
            } else if heading.1 == other.heading.0 && -heading.0 == other.heading.1 {
                if percept.right != Heading::Forward && percept.right != Heading::Left {
                    percept.right = intent;
                }
            } else if percept.left != Heading::Forward {
                percept.left = intent;
            }
        }

        percept
    }

    /// Apply right-of-way rules and move the car at `index` if allowed
    ///
    /// **Returns** `Some(moved)` for a driving action, `None` for waiting
    fn drive(&mut self, index: usize, action: Action) -> Option<bool> {
        let percept = self.sense_for(index);
        let car = self.cars[index];
        let green = percept.light == Light::Green;

        let heading = match action {
            Action::Wait => return None,
            Action::Forward => green.then_some(car.heading),
            Action::Left => (green
                && matches!(percept.oncoming, Heading::None | Heading::Left))
            .then(|| turn_left(car.heading)),
            Action::Right => {
                (green || percept.left != Heading::Forward).then(|| turn_right(car.heading))
            }
        };

        let Some(heading) = heading else {
            return Some(false);
        };

        let (w, h) = self.config.grid_size;
        let location = (
            (car.location.0 + heading.0 - 1).rem_euclid(w) + 1,
            (car.location.1 + heading.1 - 1).rem_euclid(h) + 1,
        );
        let car = &mut self.cars[index];
        car.location = location;
        car.heading = heading;
        Some(true)
    }

    fn move_dummies(&mut self) {
        for i in 1..self.cars.len() {
            let percept = self.sense_for(i);
            let intent = self.cars[i].intent;
            let red = percept.light == Light::Red;
            let okay = match intent {
                Heading::Right => !(red && percept.left == Heading::Forward),
                Heading::Forward => !red,
                Heading::Left => {
                    !red && !matches!(percept.oncoming, Heading::Forward | Heading::Right)
                }
                Heading::None => false,
            };
            if okay {
                self.drive(i, Action::from(intent));
                self.cars[i].intent = self.random_intent();
            }
        }
    }

    fn update_deadline(&mut self) {
        if self.deadline <= self.config.hard_time_limit {
            warn!(
                "Hard time limit of {} reached at t = {}",
                self.config.hard_time_limit, self.t
            );
            self.done = true;
        } else if self.config.enforce_deadline && self.deadline <= 0 {
            self.done = true;
        }
        self.deadline -= 1;
    }
}

impl Environment for Smartcab {
    fn sense(&self) -> Percept {
        self.sense_for(0)
    }

    fn next_waypoint(&self) -> Waypoint {
        let car = self.primary();
        self.planner.next_waypoint(car.location, car.heading)
    }

    fn deadline(&self) -> i32 {
        self.deadline
    }

    fn act(&mut self, action: Action) -> f64 {
        // Other cars see where the learning car is heading
        self.cars[0].intent = action.heading();
        let waypoint = self.next_waypoint();

        let mut reward = match self.drive(0, action) {
            None => 0.0,
            Some(true) if action.heading() == waypoint => 2.0,
            Some(true) => -0.5,
            Some(false) => -1.0,
        };

        if self.primary().location == self.destination {
            if self.deadline >= 0 {
                reward += 10.0;
            }
            self.reached = true;
            self.done = true;
        }

        self.t += 1;
        self.update_deadline();
        reward
    }

    fn tick(&mut self) {
        let t = self.t;
        for light in &mut self.lights {
            light.update(t);
        }
        self.move_dummies();
    }

    fn reset(&mut self) {
        for light in &mut self.lights {
            light.reset(&mut self.rng);
        }

        let start = self.random_location();
        let mut destination = self.random_location();
        while distance(start, destination) < MIN_ROUTE {
            destination = self.random_location();
        }

        self.cars[0] = Car {
            location: start,
            heading: self.random_heading(),
            intent: Heading::None,
        };
        for i in 1..self.cars.len() {
            self.cars[i] = Car {
                location: self.random_location(),
                heading: self.random_heading(),
                intent: self.random_intent(),
            };
        }

        self.planner.route_to(destination);
        self.destination = destination;
        self.deadline = distance(start, destination) * self.config.deadline_factor;
        self.t = 0;
        self.done = false;
        self.reached = false;
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn reached_destination(&self) -> bool {
        self.reached
    }
}

/// Manhattan distance, ignoring wrap-around
pub fn distance(a: Pos, b: Pos) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(dummies: usize) -> Smartcab {
        Smartcab::new(WorldConfig {
            dummies,
            seed: Some(5),
            ..Default::default()
        })
        .unwrap()
    }

    /// Park the learning car at `location` heading `heading` with every light open north-south
    fn place(world: &mut Smartcab, location: Pos, heading: Dir) {
        world.cars[0].location = location;
        world.cars[0].heading = heading;
        for light in &mut world.lights {
            light.north_south = true;
        }
    }

    #[test]
    fn rejects_tiny_grid() {
        let config = WorldConfig {
            grid_size: (2, 2),
            ..Default::default()
        };
        assert!(matches!(Smartcab::new(config), Err(Error::InvalidWorld(_))));
    }

    #[test]
    fn rejects_non_positive_deadline_factor() {
        for deadline_factor in [0, -5] {
            let config = WorldConfig {
                deadline_factor,
                ..Default::default()
            };
            assert!(matches!(Smartcab::new(config), Err(Error::InvalidWorld(_))));
        }
    }

    #[test]
    fn reset_sets_route_and_deadline() {
        let mut world = world(3);
        for _ in 0..20 {
            world.reset();
            let start = world.primary().location;
            let dist = distance(start, world.destination());
            assert!(dist >= MIN_ROUTE);
            assert_eq!(world.deadline(), dist * 5);
            assert_ne!(world.next_waypoint(), Heading::None);
            assert!(!world.is_done());
        }
    }

    #[test]
    fn light_flips_after_period() {
        let mut light = TrafficLight {
            north_south: true,
            period: 3,
            last_updated: 0,
        };
        assert_eq!(light.color(NORTH), Light::Green);
        assert_eq!(light.color(EAST), Light::Red);
        light.update(2);
        assert!(light.north_south);
        light.update(3);
        assert!(!light.north_south);
        assert_eq!(light.color(WEST), Light::Green);
    }

    #[test]
    fn rewards() {
        let mut world = world(0);
        world.destination = (8, 6);
        world.planner.route_to((8, 6));

        place(&mut world, (3, 3), SOUTH);
        assert_eq!(world.act(Action::Wait), 0.0);

        // Waypoint is left (toward the east) and the light is green
        place(&mut world, (3, 3), SOUTH);
        assert_eq!(world.next_waypoint(), Heading::Left);
        assert_eq!(world.act(Action::Left), 2.0);
        assert_eq!(world.primary().location, (4, 3));
        assert_eq!(world.primary().heading, EAST);

        place(&mut world, (3, 3), SOUTH);
        assert_eq!(world.act(Action::Forward), -0.5);
        assert_eq!(world.primary().location, (3, 4));

        // Red light for east-west travel
        place(&mut world, (3, 3), EAST);
        assert_eq!(world.act(Action::Forward), -1.0);
        assert_eq!(world.primary().location, (3, 3), "Illegal move stays put");
    }

    /// An eastbound learning car at (4, 4) with two other cars on the same intersection
    fn crowded(first: (Dir, Heading), second: (Dir, Heading)) -> Percept {
        let mut world = world(2);
        place(&mut world, (4, 4), EAST);
        for (i, (heading, intent)) in [first, second].into_iter().enumerate() {
            world.cars[i + 1] = Car {
                location: (4, 4),
                heading,
                intent,
            };
        }
        world.sense()
    }

    #[test]
    fn oncoming_left_turn_is_never_masked() {
        let left = (WEST, Heading::Left);
        let forward = (WEST, Heading::Forward);
        assert_eq!(crowded(left, forward).oncoming, Heading::Left);
        assert_eq!(crowded(forward, left).oncoming, Heading::Left);
        assert_eq!(
            crowded((WEST, Heading::Right), forward).oncoming,
            Heading::Forward
        );
    }

    #[test]
    fn right_traffic_keeps_forward_and_left() {
        let forward = (NORTH, Heading::Forward);
        let left = (NORTH, Heading::Left);
        let right = (NORTH, Heading::Right);
        assert_eq!(crowded(forward, right).right, Heading::Forward);
        assert_eq!(crowded(right, forward).right, Heading::Forward);
        assert_eq!(crowded(left, right).right, Heading::Left);
        assert_eq!(crowded(forward, left).right, Heading::Forward);
    }

    #[test]
    fn left_traffic_keeps_forward() {
        let forward = (SOUTH, Heading::Forward);
        let left = (SOUTH, Heading::Left);
        let right = (SOUTH, Heading::Right);
        assert_eq!(crowded(forward, left).left, Heading::Forward);
        assert_eq!(crowded(right, forward).left, Heading::Forward);
        assert_eq!(crowded(left, right).left, Heading::Right, "Otherwise the last car wins");
    }

    #[test]
    fn crowded_sides_are_independent() {
        let percept = crowded((WEST, Heading::Right), (SOUTH, Heading::Left));
        assert_eq!(percept.oncoming, Heading::Right);
        assert_eq!(percept.left, Heading::Left);
        assert_eq!(percept.right, Heading::None);

        // A car travelling the same way is not traffic to yield to
        let percept = crowded((EAST, Heading::Forward), (NORTH, Heading::Right));
        assert_eq!(percept.oncoming, Heading::None);
        assert_eq!(percept.left, Heading::None);
        assert_eq!(percept.right, Heading::Right);
    }

    #[test]
    fn right_on_red_yields_to_left_traffic() {
        let mut world = world(1);
        place(&mut world, (4, 4), EAST);
        assert_eq!(world.sense().light, Light::Red);

        // Car from the left, heading south, going straight through
        world.cars[1] = Car {
            location: (4, 4),
            heading: SOUTH,
            intent: Heading::Forward,
        };
        assert_eq!(world.sense().left, Heading::Forward);
        assert_eq!(world.act(Action::Right), -1.0);

        place(&mut world, (4, 4), EAST);
        world.cars[1].intent = Heading::Right;
        assert_ne!(world.act(Action::Right), -1.0);
    }

    #[test]
    fn left_turn_yields_to_oncoming() {
        let mut world = world(1);
        place(&mut world, (4, 4), NORTH);
        world.cars[1] = Car {
            location: (4, 4),
            heading: SOUTH,
            intent: Heading::Forward,
        };
        let percept = world.sense();
        assert_eq!(percept.light, Light::Green);
        assert_eq!(percept.oncoming, Heading::Forward);
        assert_eq!(world.act(Action::Left), -1.0);

        place(&mut world, (4, 4), NORTH);
        world.cars[1].intent = Heading::Left;
        assert_ne!(world.act(Action::Left), -1.0);
    }

    #[test]
    fn sense_right_traffic() {
        let mut world = world(1);
        place(&mut world, (2, 2), EAST);
        world.cars[1] = Car {
            location: (2, 2),
            heading: NORTH,
            intent: Heading::Left,
        };
        // A northbound car approaches an eastbound one from its right
        let percept = world.sense();
        assert_eq!(percept.right, Heading::Left);
        assert_eq!(percept.left, Heading::None);

        world.cars[1].heading = SOUTH;
        let percept = world.sense();
        assert_eq!(percept.right, Heading::None);
        assert_eq!(percept.left, Heading::Left);

        world.cars[1].heading = EAST;
        let percept = world.sense();
        assert_eq!(
            (percept.oncoming, percept.left, percept.right),
            (Heading::None, Heading::None, Heading::None),
            "Same heading is ignored"
        );
    }

    #[test]
    fn wraps_around_edges() {
        let mut world = world(0);
        place(&mut world, (4, 1), NORTH);
        world.act(Action::Forward);
        assert_eq!(world.primary().location, (4, 6));
    }

    #[test]
    fn reaching_destination_ends_trial() {
        let mut world = world(0);
        place(&mut world, (5, 3), NORTH);
        world.destination = (5, 2);
        world.planner.route_to((5, 2));
        world.deadline = 3;

        assert_eq!(world.act(Action::Forward), 12.0);
        assert!(world.is_done());
        assert!(world.reached_destination());
    }

    #[test]
    fn deadline_enforcement() {
        let mut world = world(0);
        world.deadline = 1;
        world.act(Action::Wait);
        assert!(!world.is_done());
        assert_eq!(world.deadline(), 0);
        world.act(Action::Wait);
        assert!(world.is_done(), "Out of time");

        let mut world = Smartcab::new(WorldConfig {
            enforce_deadline: false,
            dummies: 0,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        world.deadline = 0;
        world.act(Action::Wait);
        assert!(!world.is_done(), "Deadline not enforced");
        world.deadline = -100;
        world.act(Action::Wait);
        assert!(world.is_done(), "Hard time limit");
    }

    #[test]
    fn dummies_stay_on_grid() {
        let mut world = world(3);
        for _ in 0..200 {
            world.tick();
            world.act(Action::Wait);
            for car in &world.cars {
                assert!((1..=8).contains(&car.location.0));
                assert!((1..=6).contains(&car.location.1));
            }
        }
    }
}
