//! A rectangular car with rate-limited controls and
//! distance sensors, driving on a [`Track`].
mod config;
mod errors;
mod sensors;

pub use config::*;
pub use errors::*;
pub use sensors::SensorReading;

use sensors::Sensor;

use crate::tracks::Track;

use std::f64::consts::TAU;

/// Limits `input` to within `rate` of `prev`.
///
/// # Examples
/// ```
/// use neurodrive_sim::cars::step_filter;
///
/// assert_eq!(step_filter(1.0, 0.0, 0.25), 0.25);
/// assert_eq!(step_filter(-1.0, 0.0, 0.25), -0.25);
/// assert_eq!(step_filter(0.1, 0.0, 0.25), 0.1);
/// ```
pub fn step_filter(input: f64, prev: f64, rate: f64) -> f64 {
    input.clamp(prev - rate, prev + rate)
}

fn normalize_angle(angle: f64) -> f64 {
    let angle = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative angles up to TAU.
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// A simulated car.
///
/// Controls requested through [`step_movement`] are passed through
/// rate limiters before acting, so a car needs many ticks to reach
/// full speed. Once any corner of the car leaves the road the car
/// is considered collided, and it stays frozen until [`reset`].
///
/// [`step_movement`]: Car::step_movement
/// [`reset`]: Car::reset
#[derive(Clone, Debug)]
pub struct Car {
    config: CarConfig,
    sensors: Box<[Sensor]>,
    start_x: f64,
    start_y: f64,
    start_rotation: f64,
    x: f64,
    y: f64,
    rotation: f64,
    forward_input: f64,
    turn_input: f64,
    distance: f64,
    average_speed: f64,
    step_count: u64,
    collided: bool,
}

impl Car {
    /// Creates a car at the origin, heading along the positive x axis.
    ///
    /// # Errors
    /// Fails if a dimension, rate or the sensor increment is not
    /// strictly positive and finite, if the sensor range is negative,
    /// or if a sensor has a zero-length direction.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::cars::{Car, CarConfig, CarError, SensorMount};
    ///
    /// let car = Car::new(CarConfig::default()).unwrap();
    /// assert_eq!(car.sensor_count(), 7);
    ///
    /// let cfg = CarConfig {
    ///     sensors: vec![SensorMount::front(0.0, 0.0)],
    ///     ..CarConfig::default()
    /// };
    /// assert_eq!(Car::new(cfg).unwrap_err(), CarError::DegenerateSensor(0));
    /// ```
    pub fn new(config: CarConfig) -> Result<Car, CarError> {
        let positive = [
            ("length", config.length),
            ("width", config.width),
            ("forward_rate", config.forward_rate),
            ("reversal_rate_factor", config.reversal_rate_factor),
            ("turn_rate", config.turn_rate),
            ("max_turn_rate", config.max_turn_rate),
            ("max_speed", config.max_speed),
            ("sensor_increment", config.sensor_increment),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CarError::InvalidConfig(field));
            }
        }
        if !(config.sensor_max.is_finite() && config.sensor_max >= 0.0) {
            return Err(CarError::InvalidConfig("sensor_max"));
        }

        let sensors = config
            .sensors
            .iter()
            .enumerate()
            .map(|(i, mount)| Sensor::new(i, *mount))
            .collect::<Result<_, _>>()?;

        Ok(Car {
            config,
            sensors,
            start_x: 0.0,
            start_y: 0.0,
            start_rotation: 0.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            forward_input: 0.0,
            turn_input: 0.0,
            distance: 0.0,
            average_speed: 0.0,
            step_count: 0,
            collided: false,
        })
    }

    /// Moves the start position and resets the car.
    pub fn set_pos(&mut self, x: f64, y: f64) {
        self.start_x = x;
        self.start_y = y;
        self.reset();
    }

    /// Changes the start heading and resets the car.
    pub fn set_start_rotation(&mut self, rotation: f64) {
        self.start_rotation = rotation;
        self.reset();
    }

    /// Returns the car to its start pose, at rest, with
    /// all statistics and sensor readings cleared.
    pub fn reset(&mut self) {
        self.x = self.start_x;
        self.y = self.start_y;
        self.rotation = normalize_angle(self.start_rotation);
        self.forward_input = 0.0;
        self.turn_input = 0.0;
        self.distance = 0.0;
        self.average_speed = 0.0;
        self.step_count = 0;
        self.collided = false;
        for sensor in self.sensors.iter_mut() {
            sensor.clear();
        }
    }

    /// Advances the car by one tick.
    ///
    /// `forward` and `turn` are clamped to `[-1, 1]` and rate-limited.
    /// The heading is updated first and the car then moves along the
    /// new heading. Afterwards collision is checked and the sensors
    /// are cast. Does nothing once the car has collided.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::cars::Car;
    /// use neurodrive_sim::tracks::{RoadGrid, TileKind};
    ///
    /// let mut grid = RoadGrid::new(1, 3).unwrap();
    /// for row in 0..3 {
    ///     grid.set(row, 0, TileKind::StraightVertical).unwrap();
    /// }
    /// let mut car = Car::default();
    /// car.set_pos(60.0, 60.0);
    /// car.set_start_rotation(std::f64::consts::FRAC_PI_2);
    ///
    /// for _ in 0..100 {
    ///     car.step_movement(&grid, 1.0, 0.0);
    /// }
    /// assert!(!car.has_collided());
    /// assert!(car.y() > 60.0);
    /// assert_eq!(car.step_count(), 100);
    /// ```
    pub fn step_movement<T: Track + ?Sized>(&mut self, track: &T, forward: f64, turn: f64) {
        if self.collided {
            return;
        }
        let forward = forward.clamp(-1.0, 1.0);
        let turn = turn.clamp(-1.0, 1.0);

        let same_direction = (forward >= 0.0 && self.forward_input >= 0.0)
            || (forward <= 0.0 && self.forward_input <= 0.0);
        let forward_rate = if same_direction {
            self.config.forward_rate
        } else {
            self.config.forward_rate * self.config.reversal_rate_factor
        };
        self.forward_input = step_filter(forward, self.forward_input, forward_rate);
        self.turn_input = step_filter(turn, self.turn_input, self.config.turn_rate);

        // Turning authority grows with speed.
        let effective_turn = (self.forward_input * 2.0).clamp(-1.0, 1.0) * self.turn_input;
        self.rotation =
            normalize_angle(self.rotation + self.config.max_turn_rate * effective_turn);

        let speed = self.config.max_speed * self.forward_input;
        self.x += self.rotation.cos() * speed;
        self.y += self.rotation.sin() * speed;
        self.distance += speed;

        let n = self.step_count as f64;
        self.average_speed = (self.average_speed * n + speed) / (n + 1.0);
        self.step_count += 1;

        self.check_collision(track);
        self.sense(track);
    }

    fn check_collision<T: Track + ?Sized>(&mut self, track: &T) {
        let (cos, sin) = (self.rotation.cos(), self.rotation.sin());
        let half_length = self.config.length / 2.0;
        let half_width = self.config.width / 2.0;
        let corners = [
            (half_length, half_width),
            (half_length, -half_width),
            (-half_length, half_width),
            (-half_length, -half_width),
        ];
        self.collided = corners.iter().any(|&(lon, lat)| {
            let x = self.x + lon * cos - lat * sin;
            let y = self.y + lon * sin + lat * cos;
            !track.is_on_road(x, y)
        });
    }

    /// Casts every sensor from the current pose without moving.
    pub fn sense<T: Track + ?Sized>(&mut self, track: &T) {
        let frame = (self.x, self.y, self.rotation.cos(), self.rotation.sin());
        let half_length = self.config.length / 2.0;
        for sensor in self.sensors.iter_mut() {
            sensor.cast(
                track,
                frame,
                half_length,
                self.config.sensor_increment,
                self.config.sensor_max,
            );
        }
    }

    /// Returns the latest reading of the sensor at `index`.
    ///
    /// # Errors
    /// Fails if `index` is not below [`sensor_count`](Car::sensor_count).
    pub fn sensor(&self, index: usize) -> Result<&SensorReading, CarError> {
        self.sensors
            .get(index)
            .map(Sensor::reading)
            .ok_or(CarError::IndexOutOfRange {
                index,
                count: self.sensors.len(),
            })
    }

    /// Returns an iterator over the latest readings, in mount order.
    pub fn sensors(&self) -> impl Iterator<Item = &SensorReading> {
        self.sensors.iter().map(Sensor::reading)
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Signed distance travelled since the last reset.
    /// Reversing decreases it.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn has_collided(&self) -> bool {
        self.collided
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Mean signed speed over all ticks since the last reset.
    pub fn average_speed(&self) -> f64 {
        self.average_speed
    }

    /// Returns the rate-limited forward input.
    pub fn forward_input(&self) -> f64 {
        self.forward_input
    }

    /// Returns the rate-limited turn input.
    pub fn turn_input(&self) -> f64 {
        self.turn_input
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Heading in radians, in `[0, 2π)`.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Returns the start position and heading.
    pub fn start_pose(&self) -> (f64, f64, f64) {
        (self.start_x, self.start_y, self.start_rotation)
    }

    pub fn config(&self) -> &CarConfig {
        &self.config
    }
}

impl Default for Car {
    fn default() -> Self {
        Car::new(CarConfig::default()).expect("the default car configuration is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{RoadGrid, RoadTile, TileKind};

    use std::f64::consts::{FRAC_PI_2, PI};

    struct Asphalt;

    impl RoadTile for Asphalt {
        fn point_on_road(&self, _x: f64, _y: f64) -> bool {
            true
        }

        fn origin(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
    }

    /// A track that is road everywhere.
    struct OpenField;

    impl Track for OpenField {
        fn tile_at(&self, _x: f64, _y: f64) -> Option<&dyn RoadTile> {
            Some(&Asphalt)
        }
    }

    fn vertical_strip(rows: usize) -> RoadGrid {
        let mut grid = RoadGrid::new(1, rows).unwrap();
        for row in 0..rows {
            grid.set(row, 0, TileKind::StraightVertical).unwrap();
        }
        grid
    }

    fn facing_down_at(x: f64, y: f64) -> Car {
        let mut car = Car::default();
        car.set_pos(x, y);
        car.set_start_rotation(FRAC_PI_2);
        car
    }

    #[test]
    fn default_matches_default_config() {
        let car = Car::default();
        let checked = Car::new(CarConfig::default()).unwrap();
        assert_eq!(car.sensor_count(), checked.sensor_count());
        assert_eq!(car.config(), checked.config());
    }

    #[test]
    fn invalid_configs() {
        let cases = [
            (
                CarConfig {
                    width: 0.0,
                    ..CarConfig::default()
                },
                CarError::InvalidConfig("width"),
            ),
            (
                CarConfig {
                    sensor_increment: -2.0,
                    ..CarConfig::default()
                },
                CarError::InvalidConfig("sensor_increment"),
            ),
            (
                CarConfig {
                    sensor_max: f64::NAN,
                    ..CarConfig::default()
                },
                CarError::InvalidConfig("sensor_max"),
            ),
            (
                CarConfig {
                    sensors: vec![SensorMount::front(1.0, 0.0), SensorMount::front(0.0, 0.0)],
                    ..CarConfig::default()
                },
                CarError::DegenerateSensor(1),
            ),
        ];
        for (config, error) in cases {
            assert_eq!(Car::new(config).unwrap_err(), error);
        }
    }

    #[test]
    fn inputs_are_rate_limited() {
        let mut car = Car::default();
        car.step_movement(&OpenField, 1.0, 1.0);
        assert_eq!(car.forward_input(), 0.005);
        assert_eq!(car.turn_input(), 0.075);
        car.step_movement(&OpenField, 5.0, -5.0);
        assert_eq!(car.forward_input(), 0.01);
        assert_eq!(car.turn_input(), 0.0);
    }

    #[test]
    fn reversal_is_faster() {
        let mut car = Car::default();
        for _ in 0..20 {
            car.step_movement(&OpenField, 1.0, 0.0);
        }
        let before = car.forward_input();
        car.step_movement(&OpenField, -1.0, 0.0);
        assert!((before - car.forward_input() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn rotates_then_translates() {
        let mut car = Car::default();
        car.step_movement(&OpenField, 1.0, 1.0);
        let speed = 1.5 * 0.005;
        assert!((car.rotation() - 1.5e-5).abs() < 1e-15);
        assert_eq!(car.x(), car.rotation().cos() * speed);
        assert_eq!(car.y(), car.rotation().sin() * speed);
        assert_eq!(car.distance(), speed);
        assert_eq!(car.average_speed(), speed);
        assert_eq!(car.step_count(), 1);
    }

    #[test]
    fn reversing_decreases_distance() {
        let mut car = Car::default();
        for _ in 0..10 {
            car.step_movement(&OpenField, -1.0, 0.0);
        }
        assert!(car.distance() < 0.0);
        assert!(car.average_speed() < 0.0);
        assert!(car.x() < 0.0);
    }

    #[test]
    fn rotation_stays_normalized() {
        let mut car = Car::default();
        car.set_start_rotation(-FRAC_PI_2);
        assert!((car.rotation() - 3.0 * FRAC_PI_2).abs() < 1e-12);

        car.set_start_rotation(0.0);
        for _ in 0..2000 {
            car.step_movement(&OpenField, 1.0, -1.0);
            assert!((0.0..TAU).contains(&car.rotation()));
        }
        car.set_start_rotation(5.0 * PI);
        assert!((car.rotation() - PI).abs() < 1e-12);
    }

    #[test]
    fn reset_restores_start() {
        let grid = vertical_strip(3);
        let mut car = facing_down_at(60.0, 60.0);
        car.sense(&grid);
        for _ in 0..50 {
            car.step_movement(&grid, 1.0, 0.3);
        }
        car.reset();
        assert_eq!((car.x(), car.y()), (60.0, 60.0));
        assert_eq!(car.rotation(), FRAC_PI_2);
        assert_eq!(car.distance(), 0.0);
        assert_eq!(car.step_count(), 0);
        assert_eq!(car.average_speed(), 0.0);
        assert_eq!(car.forward_input(), 0.0);
        assert_eq!(car.turn_input(), 0.0);
        assert!(!car.has_collided());
        assert!(car.sensors().all(|r| *r == SensorReading::default()));
    }

    #[test]
    fn collides_with_grass_and_freezes() {
        let mut grid = RoadGrid::new(1, 2).unwrap();
        grid.set(0, 0, TileKind::StraightVertical).unwrap();
        let mut car = facing_down_at(60.0, 60.0);

        for _ in 0..500 {
            car.step_movement(&grid, 1.0, 0.0);
            if car.has_collided() {
                break;
            }
        }
        assert!(car.has_collided());
        // The front corners cross into the grass row.
        assert!(car.y() + 30.0 >= 120.0);

        let pose = (car.x(), car.y(), car.rotation(), car.step_count());
        car.step_movement(&grid, 1.0, 1.0);
        assert_eq!(pose, (car.x(), car.y(), car.rotation(), car.step_count()));
    }

    #[test]
    fn leaving_the_grid_is_a_collision() {
        let grid = vertical_strip(1);
        let mut car = facing_down_at(60.0, 60.0);
        for _ in 0..500 {
            car.step_movement(&grid, -1.0, 0.0);
        }
        assert!(car.has_collided());
        assert!(car.y() - 30.0 < 0.0);
    }

    #[test]
    fn sensor_reaches_max_on_open_road() {
        let grid = vertical_strip(3);
        let mut car = facing_down_at(60.0, 60.0);
        car.sense(&grid);
        let reading = car.sensor(0).unwrap();
        assert_eq!(reading.distance, 50.0);
        assert!((reading.start.1 - 90.0).abs() < 1e-12);
        assert!((reading.impact.1 - 140.0).abs() < 1e-12);
    }

    #[test]
    fn sensor_stops_at_road_edge() {
        let grid = vertical_strip(1);
        let mut car = facing_down_at(60.0, 60.0);
        car.sense(&grid);
        let reading = car.sensor(0).unwrap();
        assert_eq!(reading.distance, 30.0);
        assert!((reading.impact.0 - 60.0).abs() < 1e-9);
        assert!((reading.impact.1 - 120.0).abs() < 1e-9);
    }

    #[test]
    fn sensor_origin_off_road_reads_zero() {
        let grid = RoadGrid::new(1, 1).unwrap();
        let mut car = facing_down_at(60.0, 60.0);
        car.sense(&grid);
        assert!(car.sensors().all(|r| r.distance == 0.0));
        assert!(car.sensors().all(|r| r.start == r.impact));
    }

    #[test]
    fn sensor_distances_stay_in_range() {
        let grid = RoadGrid::from_layout(&crate::tracks::layouts::hairpin()).unwrap();
        let (x, y, rotation) = grid.start_pose();
        let mut car = Car::default();
        car.set_pos(x, y);
        car.set_start_rotation(rotation);
        for tick in 0..400 {
            let turn = if tick % 80 < 40 { 1.0 } else { -1.0 };
            car.step_movement(&grid, 1.0, turn);
            assert!(car
                .sensors()
                .all(|r| (0.0..=car.config().sensor_max).contains(&r.distance)));
        }
    }

    #[test]
    fn sensor_index_out_of_range() {
        let car = Car::default();
        assert_eq!(
            car.sensor(7),
            Err(CarError::IndexOutOfRange { index: 7, count: 7 })
        );
    }

    #[test]
    fn rear_sensor() {
        let grid = vertical_strip(3);
        let mut car = Car::new(CarConfig {
            sensors: vec![SensorMount {
                delta_lon: -1.0,
                delta_lat: 0.0,
                front: false,
            }],
            ..CarConfig::default()
        })
        .unwrap();
        car.set_pos(60.0, 180.0);
        car.set_start_rotation(FRAC_PI_2);
        car.sense(&grid);
        let reading = car.sensor(0).unwrap();
        assert!((reading.start.1 - 150.0).abs() < 1e-12);
        assert_eq!(reading.distance, 50.0);
        assert!((reading.impact.1 - 100.0).abs() < 1e-9);
    }
}
