use serde::Serialize;

/// Which drawing tools the map toolbar offers. Line drawing stays off, the
/// editor works on polygons, rectangles and markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawToolOptions {
    pub polyline: bool,
    pub polygon: bool,
    pub rectangle: bool,
    pub circle: bool,
    pub marker: bool,
    pub edit: bool,
}

impl Default for DrawToolOptions {
    fn default() -> Self {
        Self {
            polyline: false,
            polygon: true,
            rectangle: true,
            circle: false,
            marker: true,
            edit: true,
        }
    }
}
