use geo::Centroid;
use serde::Serialize;

use crate::geofile::feature::FeatureCollection;

pub const DEFAULT_ZOOM: u8 = 10;

/// Initial viewport of the map: where to center and how far to zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: MapCenter,
    pub zoom: u8,
}

/// WGS84 map center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    pub lon: f64,
    pub lat: f64,
}

/// Compute the initial viewport for a collection: the mean of the feature
/// centroids at a fixed zoom level.
pub fn view_for_collection(features: &FeatureCollection) -> MapView {
    let centroids: Vec<geo::Point> = features
        .iter()
        .filter_map(|feature| feature.geometry.centroid())
        .collect();
    if centroids.len() < features.len() {
        log::warn!(
            "Out of {} features, only {} have a defined centroid",
            features.len(),
            centroids.len()
        );
    }
    let center = match centroids.len() {
        0 => {
            log::warn!("No centroids to center on, falling back to (0, 0)");
            MapCenter { lon: 0.0, lat: 0.0 }
        }
        count => MapCenter {
            lon: centroids.iter().map(|point| point.x()).sum::<f64>() / count as f64,
            lat: centroids.iter().map(|point| point.y()).sum::<f64>() / count as f64,
        },
    };
    MapView {
        center,
        zoom: DEFAULT_ZOOM,
    }
}
