//! Point sampling on a row-major grid.
//!
//! Positions are fractional pixel coordinates where the center of cell
//! (0, 0) is (0.0, 0.0). A position is inside the grid when it falls
//! within the outer cell edges, i.e. in `[-0.5, width - 0.5)`.

/// True when the pixel position lies within the grid's outer edges.
pub fn inside(width: usize, height: usize, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x < width as f64 - 0.5 && y < height as f64 - 0.5
}

/// Nearest neighbor sampling.
///
/// Returns the value of the cell containing the position, or NaN outside
/// the grid.
pub fn nearest_sample(data: &[f64], width: usize, height: usize, x: f64, y: f64) -> f64 {
    if !inside(width, height, x, y) {
        return f64::NAN;
    }

    let col = ((x + 0.5).floor() as usize).min(width - 1);
    let row = ((y + 0.5).floor() as usize).min(height - 1);
    data[row * width + col]
}

/// Bilinear sampling between the four surrounding cell centers.
///
/// Positions in the outer half-cell are clamped onto the edge centers.
/// Returns NaN outside the grid or when a contributing corner is missing.
pub fn bilinear_sample(data: &[f64], width: usize, height: usize, x: f64, y: f64) -> f64 {
    if !inside(width, height, x, y) {
        return f64::NAN;
    }

    let x = x.clamp(0.0, (width - 1) as f64);
    let y = y.clamp(0.0, (height - 1) as f64);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = x - x0 as f64;
    let yf = y - y0 as f64;

    let corners = [
        (data[y0 * width + x0], (1.0 - xf) * (1.0 - yf)),
        (data[y0 * width + x1], xf * (1.0 - yf)),
        (data[y1 * width + x0], (1.0 - xf) * yf),
        (data[y1 * width + x1], xf * yf),
    ];

    // Zero-weight corners do not contribute, so a missing neighbor only
    // matters when the position actually leans on it.
    let mut value = 0.0;
    for (v, w) in corners {
        if w == 0.0 {
            continue;
        }
        if v.is_nan() {
            return f64::NAN;
        }
        value += v * w;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_sample() {
        let data = vec![
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        ];

        assert_eq!(nearest_sample(&data, 3, 3, 0.0, 0.0), 1.0);
        assert_eq!(nearest_sample(&data, 3, 3, 1.0, 1.0), 5.0);
        assert_eq!(nearest_sample(&data, 3, 3, 0.4, 0.4), 1.0);
        assert_eq!(nearest_sample(&data, 3, 3, 0.6, 0.6), 5.0);
        // Outer half-cell still belongs to the edge cell
        assert_eq!(nearest_sample(&data, 3, 3, -0.5, 2.4), 7.0);
        assert!(nearest_sample(&data, 3, 3, -0.6, 0.0).is_nan());
        assert!(nearest_sample(&data, 3, 3, 2.5, 0.0).is_nan());
    }

    #[test]
    fn test_bilinear_sample() {
        let data = vec![
            1.0, 2.0,
            3.0, 4.0,
        ];

        assert_eq!(bilinear_sample(&data, 2, 2, 0.0, 0.0), 1.0);
        assert_eq!(bilinear_sample(&data, 2, 2, 1.0, 0.0), 2.0);
        assert_eq!(bilinear_sample(&data, 2, 2, 0.0, 1.0), 3.0);
        assert_eq!(bilinear_sample(&data, 2, 2, 1.0, 1.0), 4.0);
        assert!((bilinear_sample(&data, 2, 2, 0.5, 0.5) - 2.5).abs() < 1e-12);
        // Clamped in the outer half-cell
        assert_eq!(bilinear_sample(&data, 2, 2, -0.25, -0.25), 1.0);
    }

    #[test]
    fn test_bilinear_with_nan() {
        let data = vec![
            1.0, f64::NAN,
            3.0, 4.0,
        ];

        assert!(bilinear_sample(&data, 2, 2, 0.5, 0.5).is_nan());
        // Exactly on a valid center the NaN neighbor has no weight
        assert_eq!(bilinear_sample(&data, 2, 2, 0.0, 0.0), 1.0);
        assert!(bilinear_sample(&data, 2, 2, 0.5, 0.0).is_nan());
    }
}
