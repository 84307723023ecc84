//! ESRI ASCII grid (AAIGrid) codec.
//!
//! This is the interchange format of the FUSION `DTM2ASCII` and
//! `ASCII2DTM` tools and of `gdal_translate -of AAIGrid`:
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     412300.0      (or xllcenter)
//! yllcorner     3512880.0     (or yllcenter)
//! cellsize      1.0           (or dx / dy)
//! NODATA_value  -9999         (optional)
//! v00 v01 v02 v03             top row first
//! ...
//! ```
//!
//! Header keys are case-insensitive. Values may wrap across lines.

use dewarp_common::GeoTransform;

use crate::error::{RasterError, RasterResult};
use crate::raster::RasterData;

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<(f64, bool)>,
    yll: Option<(f64, bool)>,
    cellsize: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

fn parse_number<T: std::str::FromStr>(token: &str, line: usize, key: &str) -> RasterResult<T> {
    token
        .parse()
        .map_err(|_| RasterError::parse(line, format!("invalid value '{}' for {}", token, key)))
}

/// Parse an ASCII grid document.
pub fn parse(text: &str) -> RasterResult<RasterData> {
    let mut header = Header::default();
    let mut lines = text.lines().enumerate().peekable();

    // Header
    while let Some(&(idx, line)) = lines.peek() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            lines.next();
            continue;
        };
        let key_lower = key.to_ascii_lowercase();
        let is_header_key = matches!(
            key_lower.as_str(),
            "ncols"
                | "nrows"
                | "xllcorner"
                | "xllcenter"
                | "yllcorner"
                | "yllcenter"
                | "cellsize"
                | "dx"
                | "dy"
                | "nodata_value"
        );
        if !is_header_key {
            break;
        }

        let line_no = idx + 1;
        let value = tokens
            .next()
            .ok_or_else(|| RasterError::parse(line_no, format!("{} has no value", key)))?;

        match key_lower.as_str() {
            "ncols" => header.ncols = Some(parse_number(value, line_no, key)?),
            "nrows" => header.nrows = Some(parse_number(value, line_no, key)?),
            "xllcorner" => header.xll = Some((parse_number(value, line_no, key)?, false)),
            "xllcenter" => header.xll = Some((parse_number(value, line_no, key)?, true)),
            "yllcorner" => header.yll = Some((parse_number(value, line_no, key)?, false)),
            "yllcenter" => header.yll = Some((parse_number(value, line_no, key)?, true)),
            "cellsize" => header.cellsize = Some(parse_number(value, line_no, key)?),
            "dx" => header.dx = Some(parse_number(value, line_no, key)?),
            "dy" => header.dy = Some(parse_number(value, line_no, key)?),
            _ => header.nodata = Some(parse_number(value, line_no, key)?),
        }
        lines.next();
    }

    let width = header.ncols.ok_or(RasterError::MissingHeader("ncols"))?;
    let height = header.nrows.ok_or(RasterError::MissingHeader("nrows"))?;
    let (xll, x_center) = header.xll.ok_or(RasterError::MissingHeader("xllcorner"))?;
    let (yll, y_center) = header.yll.ok_or(RasterError::MissingHeader("yllcorner"))?;
    let (dx, dy) = match (header.cellsize, header.dx, header.dy) {
        (_, Some(dx), Some(dy)) => (dx, dy),
        (Some(size), _, _) => (size, size),
        _ => return Err(RasterError::MissingHeader("cellsize")),
    };

    // Body. The header is not trusted for allocation.
    let expected = width
        .checked_mul(height)
        .ok_or(RasterError::Dimensions { width, height })?;
    let mut values = Vec::new();
    for (idx, line) in lines {
        for token in line.split_whitespace() {
            values.push(parse_number::<f64>(token, idx + 1, "cell")?);
        }
    }
    if values.len() != expected {
        return Err(RasterError::ValueCount {
            width,
            height,
            expected,
            actual: values.len(),
        });
    }

    let min_x = if x_center { xll - dx / 2.0 } else { xll };
    let min_y = if y_center { yll - dy / 2.0 } else { yll };
    let max_y = min_y + height as f64 * dy;

    Ok(RasterData {
        values,
        width,
        height,
        geotransform: GeoTransform::north_up(min_x, max_y, dx, dy),
        crs: None,
        nodata: header.nodata,
    })
}

/// Format a raster as an ASCII grid document.
///
/// Uses `cellsize` for square cells and `dx`/`dy` otherwise. Values are
/// written in their shortest exact decimal form.
pub fn format(raster: &RasterData) -> String {
    let gt = &raster.geotransform;
    let (dx, dy) = gt.cell_size();
    let extent = gt.extent(raster.width, raster.height);

    let mut out = String::with_capacity(raster.values.len() * 8 + 128);
    out.push_str(&format!("ncols        {}\n", raster.width));
    out.push_str(&format!("nrows        {}\n", raster.height));
    out.push_str(&format!("xllcorner    {}\n", extent.min_x));
    out.push_str(&format!("yllcorner    {}\n", extent.min_y));
    if dx == dy {
        out.push_str(&format!("cellsize     {}\n", dx));
    } else {
        out.push_str(&format!("dx           {}\n", dx));
        out.push_str(&format!("dy           {}\n", dy));
    }
    if let Some(nodata) = raster.nodata {
        out.push_str(&format!("NODATA_value {}\n", nodata));
    }

    if raster.width > 0 {
        for row in raster.values.chunks(raster.width) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
    }
    out
}
