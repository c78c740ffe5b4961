#[cfg(test)]
mod tests {
    use crate::constants::*;
    use crate::enums::*;
    use crate::types::{GeoPoint, ObserverFix, Sighting, Target};

    /// Verify all enums round-trip through serde_json.
    #[test]
    fn test_target_category_serde() {
        let variants = vec![
            TargetCategory::Terrain,
            TargetCategory::Settlement,
            TargetCategory::UserMarker,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: TargetCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_visibility_serde() {
        let variants = vec![
            Visibility::Visible,
            Visibility::Occluded(Occlusion::OutOfRange),
            Visibility::Occluded(Occlusion::BelowHorizon { min_height: 121.5 }),
            Visibility::Occluded(Occlusion::Terrain {
                fraction: 0.5,
                elevation: 1800.0,
                threshold: 640.0,
            }),
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: Visibility = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_sighting_and_target_serde() {
        let target = Target::new(GeoPoint::new(35.3606, 138.7274), 3776.0, TargetCategory::Terrain);
        let json = serde_json::to_string(&target).unwrap();
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(target, back);

        let fix = ObserverFix::new(GeoPoint::new(35.6605, 139.7291), 238.1);
        let json = serde_json::to_string(&fix).unwrap();
        let back: ObserverFix = serde_json::from_str(&json).unwrap();
        assert_eq!(fix, back);

        let sighting = Sighting::visible(98_000.0, 243.0);
        let json = serde_json::to_string(&sighting).unwrap();
        let back: Sighting = serde_json::from_str(&json).unwrap();
        assert_eq!(sighting, back);
    }

    #[test]
    fn test_grid_layout() {
        assert_eq!(TILES_X, 17);
        assert_eq!(TILES_Y, 23);
        assert_eq!(GRID_WIDTH, 15_300);
        assert_eq!(GRID_HEIGHT, 13_800);
        assert_eq!(TILE_LEN, 540_000);
        // A tile spans one degree of longitude and 40 minutes of latitude
        assert!((X_PITCH * TILE_WIDTH as f64 - 1.0).abs() < 1e-12);
        assert!((Y_PITCH * TILE_HEIGHT as f64 - 2.0 / 3.0).abs() < 1e-12);
        assert!((ORIGIN_LNG - 129.0).abs() < X_PITCH);
        assert!((ORIGIN_LAT - 46.0 / 1.5).abs() < Y_PITCH);
    }

    #[test]
    fn test_effective_radius_exceeds_geometric() {
        assert!(EFFECTIVE_EARTH_RADIUS > EARTH_RADIUS);
        let restored = EFFECTIVE_EARTH_RADIUS * (1.0 - REFRACTION_COEFFICIENT);
        assert!((restored - EARTH_RADIUS).abs() < 1e-6);
    }
}
