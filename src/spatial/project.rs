//! Projections from geographic (longitude, latitude) positions into the
//! planar, metric coordinate system the network is expressed in.

use geo::{Coord, LineString, Point};

/// Mean radius of the earth in meters, as used by the IUGG.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Radius of the sphere underlying EPSG:3857, in meters.
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which the web-mercator projection is clamped.
const WEB_MERCATOR_MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Converts a position into the network's planar coordinate system.
pub trait Projection: Sync {
    /// Projects a single position.
    fn project(&self, value: Point) -> Point;

    /// Projects every position of a linestring.
    fn project_line(&self, value: &LineString) -> LineString {
        value
            .points()
            .map(|point| Coord::from(self.project(point)))
            .collect()
    }
}

/// The identity projection, for inputs already in network coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Planar;

impl Projection for Planar {
    #[inline]
    fn project(&self, value: Point) -> Point {
        value
    }
}

/// Spherical mercator, *EPSG:3857*.
///
/// *Learn more [here](https://en.wikipedia.org/wiki/Web_Mercator_projection?useskin=vector).*
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, value: Point) -> Point {
        let (lng, lat) = value.x_y();
        let lat = lat.clamp(-WEB_MERCATOR_MAX_LATITUDE, WEB_MERCATOR_MAX_LATITUDE);

        let x = WEB_MERCATOR_RADIUS * lng.to_radians();
        let y = WEB_MERCATOR_RADIUS
            * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                .tan()
                .ln();

        Point::new(x, y)
    }
}

/// A local equirectangular projection centred on `origin`.
///
/// Distances are close to true meters in the vicinity of the origin, which
/// makes it suitable for networks covering a single city.
#[derive(Clone, Copy, Debug)]
pub struct Equirectangular {
    pub origin: Point,
}

impl Equirectangular {
    pub fn new(origin: Point) -> Self {
        Self { origin }
    }
}

impl Projection for Equirectangular {
    fn project(&self, value: Point) -> Point {
        let scale = self.origin.y().to_radians().cos();

        let x = MEAN_EARTH_RADIUS * (value.x() - self.origin.x()).to_radians() * scale;
        let y = MEAN_EARTH_RADIUS * (value.y() - self.origin.y()).to_radians();

        Point::new(x, y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{Distance, Haversine, point};

    #[test]
    fn web_mercator_origin_and_antimeridian() {
        let origin = WebMercator.project(point! { x: 0.0, y: 0.0 });
        assert_relative_eq!(origin.x(), 0.0);
        assert_relative_eq!(origin.y(), 0.0, epsilon = 1e-6);

        let edge = WebMercator.project(point! { x: 180.0, y: 0.0 });
        assert_relative_eq!(edge.x(), 20_037_508.342789244, max_relative = 1e-9);

        // Latitudes are clamped to the square extent
        let pole = WebMercator.project(point! { x: 0.0, y: 90.0 });
        assert_relative_eq!(pole.y(), 20_037_508.342789244, max_relative = 1e-6);
    }

    #[test]
    fn equirectangular_is_metric_near_origin() {
        let origin = point! { x: -77.0365, y: 38.8977 };
        let other = point! { x: -77.0300, y: 38.9000 };
        let projection = Equirectangular::new(origin);

        let planar = projection.project(other);
        let planar = planar.x().hypot(planar.y());

        assert_relative_eq!(planar, Haversine.distance(origin, other), max_relative = 1e-3);
    }

    #[test]
    fn planar_is_identity() {
        let shape = geo::wkt! { LINESTRING (1.0 2.0, 3.0 4.0) };
        assert_eq!(Planar.project_line(&shape), shape);
    }
}
