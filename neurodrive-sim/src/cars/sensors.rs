use super::{CarError, SensorMount};
use crate::tracks::Track;

/// The most recent result of a sensor cast.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorReading {
    /// World position of the ray origin.
    pub start: (f64, f64),
    /// World position of the first off-road sample,
    /// or of the end of the ray if none was found.
    pub impact: (f64, f64),
    /// Distance from `start` to `impact`.
    pub distance: f64,
}

/// A mounted sensor with its unit direction in car-local coordinates.
#[derive(Clone, Debug)]
pub(super) struct Sensor {
    mount: SensorMount,
    lon: f64,
    lat: f64,
    reading: SensorReading,
}

impl Sensor {
    pub(super) fn new(index: usize, mount: SensorMount) -> Result<Sensor, CarError> {
        let magnitude = mount.delta_lon.hypot(mount.delta_lat);
        if !magnitude.is_finite() || magnitude == 0.0 {
            return Err(CarError::DegenerateSensor(index));
        }
        Ok(Sensor {
            mount,
            lon: mount.delta_lon / magnitude,
            lat: mount.delta_lat / magnitude,
            reading: SensorReading::default(),
        })
    }

    pub(super) fn reading(&self) -> &SensorReading {
        &self.reading
    }

    pub(super) fn clear(&mut self) {
        self.reading = SensorReading::default();
    }

    /// Marches the ray from the bumper until it leaves the road
    /// or reaches `max`. `frame` is the car's `(x, y, cos, sin)`.
    pub(super) fn cast<T: Track + ?Sized>(
        &mut self,
        track: &T,
        frame: (f64, f64, f64, f64),
        half_length: f64,
        increment: f64,
        max: f64,
    ) {
        let (x, y, cos, sin) = frame;
        let offset = if self.mount.front {
            half_length
        } else {
            -half_length
        };
        let origin = (x + offset * cos, y + offset * sin);
        let direction = (
            self.lon * cos - self.lat * sin,
            self.lon * sin + self.lat * cos,
        );

        let mut distance = 0.0;
        while distance < max {
            let sample_x = origin.0 + direction.0 * distance;
            let sample_y = origin.1 + direction.1 * distance;
            if !track.is_on_road(sample_x, sample_y) {
                break;
            }
            distance += increment;
        }
        let distance = distance.min(max);

        self.reading = SensorReading {
            start: origin,
            impact: (
                origin.0 + direction.0 * distance,
                origin.1 + direction.1 * distance,
            ),
            distance,
        };
    }
}
