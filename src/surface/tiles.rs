//! Raster tile addressing

use super::viewport::{TILE_SIZE, Viewport, project};

/// A slippy-map tile address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileId {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileId {
    pub const fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Tiles per axis at this zoom
    pub fn count(z: u8) -> u32 {
        1u32 << z.min(31)
    }
}

/// Tiles that cover the viewport, row by row from the north-west corner
///
/// Fractional zooms use the tiles of the zoom level below. Columns past
/// the antimeridian wrap around; rows outside the world are skipped.
pub fn visible_tiles(view: &Viewport) -> Vec<TileId> {
    let z = view.zoom.floor().max(0.0) as u8;
    let (cx, cy) = project(view.center, f64::from(z));
    let scale = (view.zoom - f64::from(z)).exp2();
    let half_w = view.width / 2.0 / scale;
    let half_h = view.height / 2.0 / scale;

    let n = i64::from(TileId::count(z));
    let min_x = ((cx - half_w) / TILE_SIZE).floor() as i64;
    let max_x = ((cx + half_w) / TILE_SIZE).floor() as i64;
    let min_y = (((cy - half_h) / TILE_SIZE).floor() as i64).max(0);
    let max_y = (((cy + half_h) / TILE_SIZE).floor() as i64).min(n - 1);

    // At low zooms the surface can be wider than the world
    let max_x = max_x.min(min_x + n - 1);

    let mut tiles = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            tiles.push(TileId::new(x.rem_euclid(n) as u32, y as u32, z));
        }
    }
    tiles
}

/// Expand a `{s}/{z}/{x}/{y}` tile URL template
pub fn tile_url(template: &str, subdomains: &[String], tile: TileId) -> String {
    let mut url = template
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string());
    if !subdomains.is_empty() {
        let index = (tile.x as usize + tile.y as usize) % subdomains.len();
        url = url.replace("{s}", &subdomains[index]);
    }
    url
}
