//! Pixel to geodetic resolution for one resolution profile.
//!
//! Composes the profile's linear pixel/plane maps with the shared Lambert
//! Conformal Conic projection. One geolocator is built per resolution; two
//! resolutions in the same run get two fully independent instances.

use projection::{LambertConformal, ProjectionDefinition, ProjectionError};

use crate::coordinate::{GeoCoordinate, PixelCoordinate};
use crate::error::Result;
use crate::profile::{Resolution, ResolutionProfile};

/// Forward (pixel to geodetic) and inverse (geodetic to pixel) transforms
/// for one resolution profile.
#[derive(Debug, Clone)]
pub struct PixelGeolocator {
    profile: &'static ResolutionProfile,
    projection: LambertConformal,
}

impl PixelGeolocator {
    /// Build a geolocator for a resolution against a projection definition.
    pub fn new(resolution: Resolution, definition: ProjectionDefinition) -> Result<Self> {
        let projection = LambertConformal::new(definition)?;
        Ok(Self {
            profile: resolution.profile(),
            projection,
        })
    }

    /// Geolocator for the regional products: the resolution's profile over
    /// the ground segment's LCC definition.
    pub fn gk2a(resolution: Resolution) -> Result<Self> {
        Self::new(resolution, ProjectionDefinition::gk2a())
    }

    /// The profile this geolocator addresses.
    pub fn profile(&self) -> &ResolutionProfile {
        self.profile
    }

    /// The underlying projection.
    pub fn projection(&self) -> &LambertConformal {
        &self.projection
    }

    /// Resolve a pixel coordinate to latitude/longitude in degrees.
    ///
    /// The pixel index is mapped linearly onto the projected plane (top-left
    /// pixel origin, bottom-up plane axis) and run through the inverse LCC.
    /// Outputs are finite for pixels within the profile bounds; a point the
    /// projection cannot resolve is an explicit error, never an unflagged
    /// value.
    pub fn pixel_to_geo(
        &self,
        pixel: PixelCoordinate,
    ) -> std::result::Result<GeoCoordinate, ProjectionError> {
        let (plane_x, plane_y) = self
            .profile
            .pixel_to_plane(pixel.x as f64, pixel.y as f64);
        let (latitude, longitude) = self.projection.inverse(plane_x, plane_y)?;
        Ok(GeoCoordinate::new(latitude, longitude))
    }

    /// Resolve latitude/longitude in degrees to an integer pixel coordinate.
    ///
    /// The forward LCC places the point on the plane, then the linear maps
    /// are inverted and truncated with `floor`. Quantization makes
    /// forward-then-inverse exact only to within one pixel.
    pub fn geo_to_pixel(
        &self,
        coordinate: GeoCoordinate,
    ) -> std::result::Result<PixelCoordinate, ProjectionError> {
        let (plane_x, plane_y) = self
            .projection
            .forward(coordinate.latitude, coordinate.longitude)?;
        Ok(self.profile.plane_to_pixel(plane_x, plane_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_km() -> PixelGeolocator {
        PixelGeolocator::gk2a(Resolution::TwoKm).unwrap()
    }

    #[test]
    fn test_top_left_pixel_is_bbox_corner() {
        let locator = two_km();
        let geo = locator.pixel_to_geo(PixelCoordinate::new(0, 0)).unwrap();
        let profile = locator.profile();
        let (corner_lat, corner_lon) = locator
            .projection()
            .inverse(profile.x_min, profile.y_max)
            .unwrap();
        assert_eq!(geo.latitude, corner_lat);
        assert_eq!(geo.longitude, corner_lon);
        // Northwest of the projection origin.
        assert!(geo.latitude > 38.0);
        assert!(geo.longitude < 126.0);
    }

    #[test]
    fn test_grid_center_near_projection_origin() {
        // Pixel (449, 449) on the 900 grid sits ~1.4 km from the plane
        // origin, well within half a degree of (38N, 126E).
        let locator = two_km();
        let geo = locator
            .pixel_to_geo(PixelCoordinate::new(449, 449))
            .unwrap();
        assert!(
            (geo.latitude - 38.0).abs() < 0.5,
            "latitude {} too far from 38",
            geo.latitude
        );
        assert!(
            (geo.longitude - 126.0).abs() < 0.5,
            "longitude {} too far from 126",
            geo.longitude
        );
    }

    #[test]
    fn test_interior_roundtrip_within_one_pixel() {
        for resolution in Resolution::ALL {
            let locator = PixelGeolocator::gk2a(resolution).unwrap();
            let (w, h) = locator.profile().dimensions();
            let probes = [
                (w as i64 / 2, h as i64 / 2),
                (w as i64 / 4, h as i64 / 3),
                (3 * w as i64 / 4, 2 * h as i64 / 3),
                (100, 100),
            ];
            for (x, y) in probes {
                let pixel = PixelCoordinate::new(x, y);
                let geo = locator.pixel_to_geo(pixel).unwrap();
                let back = locator.geo_to_pixel(geo).unwrap();
                assert!(
                    (back.x - pixel.x).abs() <= 1 && (back.y - pixel.y).abs() <= 1,
                    "{} roundtrip drifted: {} -> {}",
                    resolution,
                    pixel,
                    back
                );
            }
        }
    }

    #[test]
    fn test_regional_window_pixels_resolve() {
        // Every corner of the regional sub-window must resolve to finite
        // coordinates roughly over East Asia.
        for resolution in Resolution::ALL {
            let locator = PixelGeolocator::gk2a(resolution).unwrap();
            let window = locator.profile().window;
            for (x, y) in [
                (window.x_start, window.y_start),
                (window.x_end - 1, window.y_start),
                (window.x_start, window.y_end - 1),
                (window.x_end - 1, window.y_end - 1),
            ] {
                let geo = locator
                    .pixel_to_geo(PixelCoordinate::new(x as i64, y as i64))
                    .unwrap();
                assert!(geo.latitude.is_finite() && geo.longitude.is_finite());
                assert!(geo.latitude > 10.0 && geo.latitude < 60.0, "{:?}", geo);
                assert!(geo.longitude > 100.0 && geo.longitude < 150.0, "{:?}", geo);
            }
        }
    }

    #[test]
    fn test_resolutions_do_not_share_geometry() {
        let two = two_km();
        let one = PixelGeolocator::gk2a(Resolution::OneKm).unwrap();
        // The same pixel index means a different place on each grid.
        let p = PixelCoordinate::new(100, 100);
        let geo_two = two.pixel_to_geo(p).unwrap();
        let geo_one = one.pixel_to_geo(p).unwrap();
        assert!((geo_two.latitude - geo_one.latitude).abs() > 0.1);
    }

    #[test]
    fn test_geo_to_pixel_of_origin() {
        let locator = two_km();
        let pixel = locator
            .geo_to_pixel(GeoCoordinate::new(38.0, 126.0))
            .unwrap();
        // The plane origin sits between pixels 449 and 450 on both axes.
        assert!((448..=450).contains(&pixel.x), "x {}", pixel.x);
        assert!((448..=450).contains(&pixel.y), "y {}", pixel.y);
    }
}
