use serde::{Deserialize, Serialize};

/// Mounting geometry of a distance sensor.
///
/// The ray points along `(delta_lon, delta_lat)` in car-local
/// coordinates (longitudinal axis forward, lateral axis to the
/// right of the heading), starting at the middle of the front
/// or rear bumper.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorMount {
    pub delta_lon: f64,
    pub delta_lat: f64,
    pub front: bool,
}

impl SensorMount {
    /// Returns a front-mounted sensor pointing along the passed direction.
    pub const fn front(delta_lon: f64, delta_lat: f64) -> SensorMount {
        SensorMount {
            delta_lon,
            delta_lat,
            front: true,
        }
    }
}

/// Configuration data for the car model.
///
/// All distances are in world units and all
/// rates are per simulation tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    /// Extent along the heading.
    pub length: f64,
    /// Extent across the heading.
    pub width: f64,
    /// Largest change of the filtered forward input per tick.
    pub forward_rate: f64,
    /// Multiplier of `forward_rate` while the requested
    /// forward input opposes the current one.
    pub reversal_rate_factor: f64,
    /// Largest change of the filtered turn input per tick.
    pub turn_rate: f64,
    /// Heading change per tick at full turn authority, in radians.
    pub max_turn_rate: f64,
    /// Distance travelled per tick at full forward input.
    pub max_speed: f64,
    /// Step length of the sensor ray march.
    pub sensor_increment: f64,
    /// Range of every sensor.
    pub sensor_max: f64,
    /// Sensor mounts, in input order.
    pub sensors: Vec<SensorMount>,
}

impl CarConfig {
    /// Returns a "zero-valued" configuration.
    /// All values are 0, false or empty.
    ///
    /// # Note
    /// This value is not a usable car: cars refuse
    /// zero dimensions and rates. It is meant as a way
    /// to abbreviate configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::cars::{Car, CarConfig};
    ///
    /// let cfg = CarConfig {
    ///     length: 40.0,
    ///     ..CarConfig::zero()
    /// };
    /// assert!(Car::new(cfg).is_err());
    /// ```
    pub const fn zero() -> CarConfig {
        CarConfig {
            length: 0.0,
            width: 0.0,
            forward_rate: 0.0,
            reversal_rate_factor: 0.0,
            turn_rate: 0.0,
            max_turn_rate: 0.0,
            max_speed: 0.0,
            sensor_increment: 0.0,
            sensor_max: 0.0,
            sensors: Vec::new(),
        }
    }
}

impl Default for CarConfig {
    fn default() -> Self {
        CarConfig {
            length: 60.0,
            width: 30.0,
            forward_rate: 0.005,
            reversal_rate_factor: 10.0,
            turn_rate: 0.075,
            max_turn_rate: 0.02,
            max_speed: 1.5,
            sensor_increment: 2.0,
            sensor_max: 50.0,
            sensors: vec![
                SensorMount::front(1.0, 0.0),
                SensorMount::front(1.0, 1.0),
                SensorMount::front(1.0, -1.0),
                SensorMount::front(0.0, 1.0),
                SensorMount::front(0.0, -1.0),
                SensorMount::front(2.0, 1.0),
                SensorMount::front(2.0, -1.0),
            ],
        }
    }
}
