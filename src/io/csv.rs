//! CSV reading and writing via Polars.
//!
//! Columns are header-named and order-independent. Coordinate columns are
//! cast non-strictly: non-numeric cells become nulls, which downstream
//! stages treat as a data-quality condition rather than an abort.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};
use polars::frame::DataFrame;
use polars::io::{SerReader, SerWriter};
use polars::prelude::{Column, CsvReader, CsvWriter, DataType, NamedFrom};
use polars::series::Series;

use crate::types::{Point, RegionAssignment};

/// One row of a reference table: `name,region` plus optional coordinates
/// feeding the nearest-point index.
#[derive(Debug, Clone)]
pub struct ReferenceRow {
    pub name: String,
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .finish()
        .with_context(|| format!("failed to read CSV from {}", path.display()))
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("failed to write CSV to {}", path.display()))
}

/// First column of `names` present in the frame. Geocoded exports name the
/// locality column inconsistently (`name` vs `suburb`), so both are tried.
fn pick_column<'a>(df: &DataFrame, names: &[&'a str]) -> Result<&'a str> {
    names
        .iter()
        .copied()
        .find(|n| df.column(n).is_ok())
        .ok_or_else(|| anyhow!("none of the columns {names:?} found in table"))
}

fn string_column(df: &DataFrame, name: &str) -> Result<Column> {
    Ok(df.column(name)?.cast(&DataType::String)?)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Option<Column>> {
    match df.column(name) {
        Ok(col) => Ok(Some(col.cast(&DataType::Float64)?)),
        Err(_) => Ok(None),
    }
}

/// Read the input point table (`name,state,latitude,longitude`).
pub fn read_points(path: &Path) -> Result<Vec<Point>> {
    let df = read_csv(path)?;
    let name_col = pick_column(&df, &["name", "suburb"])?;
    let names = string_column(&df, name_col)?;
    let states = string_column(&df, "state")
        .with_context(|| format!("point table {} needs a `state` column", path.display()))?;
    let lats = float_column(&df, "latitude")?
        .ok_or_else(|| anyhow!("point table {} needs a `latitude` column", path.display()))?;
    let lons = float_column(&df, "longitude")?
        .ok_or_else(|| anyhow!("point table {} needs a `longitude` column", path.display()))?;

    let mut points = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        points.push(Point {
            name: names.str()?.get(i).unwrap_or_default().to_string(),
            state: states.str()?.get(i).unwrap_or_default().to_string(),
            latitude: lats.f64()?.get(i),
            longitude: lons.f64()?.get(i),
        });
    }
    Ok(points)
}

/// Read a reference table (`name,region[,latitude,longitude]`).
pub fn read_reference(path: &Path) -> Result<Vec<ReferenceRow>> {
    let df = read_csv(path)?;
    let name_col = pick_column(&df, &["name", "suburb"])?;
    let region_col = pick_column(&df, &["region", "assigned_region"])?;
    let names = string_column(&df, name_col)?;
    let regions = string_column(&df, region_col)?;
    let lats = float_column(&df, "latitude")?;
    let lons = float_column(&df, "longitude")?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        rows.push(ReferenceRow {
            name: names.str()?.get(i).unwrap_or_default().to_string(),
            region: regions.str()?.get(i).unwrap_or_default().to_string(),
            latitude: lats.as_ref().and_then(|c| c.f64().ok()?.get(i)),
            longitude: lons.as_ref().and_then(|c| c.f64().ok()?.get(i)),
        });
    }
    Ok(rows)
}

/// Write the resolved output table: the input columns plus `final_region`,
/// `resolution_stage` and `was_corrected`.
pub fn write_output(points: &[Point], assignments: &[RegionAssignment], path: &Path) -> Result<()> {
    ensure!(
        points.len() == assignments.len(),
        "output row mismatch: {} points vs {} assignments",
        points.len(),
        assignments.len()
    );

    let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
    let states: Vec<&str> = points.iter().map(|p| p.state.as_str()).collect();
    let lats: Vec<Option<f64>> = points.iter().map(|p| p.latitude).collect();
    let lons: Vec<Option<f64>> = points.iter().map(|p| p.longitude).collect();
    let regions: Vec<&str> = assignments.iter().map(|a| a.region.as_str()).collect();
    let stages: Vec<&str> = assignments.iter().map(|a| a.stage.as_str()).collect();
    let corrected: Vec<bool> = assignments.iter().map(|a| a.was_corrected).collect();

    let mut df = DataFrame::new(vec![
        Series::new("name".into(), names).into(),
        Series::new("state".into(), states).into(),
        Series::new("latitude".into(), lats).into(),
        Series::new("longitude".into(), lons).into(),
        Series::new("final_region".into(), regions).into(),
        Series::new("resolution_stage".into(), stages).into(),
        Series::new("was_corrected".into(), corrected).into(),
    ])?;
    write_csv(&mut df, path)
}

/// Read the QA-relevant columns of a resolved output table:
/// `(final_region, resolution_stage, was_corrected)` per row.
pub fn read_resolved(path: &Path) -> Result<Vec<(String, String, bool)>> {
    let df = read_csv(path)?;
    let regions = string_column(&df, "final_region")
        .with_context(|| format!("{} is not a resolved output table", path.display()))?;
    let stages = string_column(&df, "resolution_stage")
        .with_context(|| format!("{} is not a resolved output table", path.display()))?;
    let corrected = df.column("was_corrected")?.cast(&DataType::Boolean)?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        rows.push((
            regions.str()?.get(i).unwrap_or_default().to_string(),
            stages.str()?.get(i).unwrap_or_default().to_string(),
            corrected.bool()?.get(i).unwrap_or(false),
        ));
    }
    Ok(rows)
}

/// Write a reference table built by the containment join
/// (`name,region,latitude,longitude`).
pub fn write_reference(rows: &[ReferenceRow], path: &Path) -> Result<()> {
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
    let lats: Vec<Option<f64>> = rows.iter().map(|r| r.latitude).collect();
    let lons: Vec<Option<f64>> = rows.iter().map(|r| r.longitude).collect();

    let mut df = DataFrame::new(vec![
        Series::new("name".into(), names).into(),
        Series::new("region".into(), regions).into(),
        Series::new("latitude".into(), lats).into(),
        Series::new("longitude".into(), lons).into(),
    ])?;
    write_csv(&mut df, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolutionStage;

    #[test]
    fn point_table_round_trip_with_bad_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("points.csv");
        // Column order differs from the canonical one; one row is
        // non-numeric and must come back as None, not an error.
        std::fs::write(
            &input,
            "state,suburb,longitude,latitude\nNSW,Bondi,151.27,-33.89\nVIC,Ghost,oops,-37.8\n",
        )
        .unwrap();

        let points = read_points(&input).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "Bondi");
        assert_eq!(points[0].coords(), Some((-33.89, 151.27)));
        assert_eq!(points[1].longitude, None);
        assert_eq!(points[1].coords(), None);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("points.csv");
        std::fs::write(&input, "place,state\nBondi,NSW\n").unwrap();
        assert!(read_points(&input).is_err());
    }

    #[test]
    fn reference_table_coordinates_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ref.csv");
        std::fs::write(&input, "suburb,assigned_region\nbondi,Eastern Suburbs\n").unwrap();

        let rows = read_reference(&input).unwrap();
        assert_eq!(rows[0].region, "Eastern Suburbs");
        assert_eq!(rows[0].latitude, None);
    }

    #[test]
    fn output_table_carries_stage_and_correction_columns() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let points = vec![Point {
            name: "Springvale".into(),
            state: "VIC".into(),
            latitude: Some(-37.95),
            longitude: Some(145.15),
        }];
        let assignments = vec![RegionAssignment {
            region: "South East Melbourne".into(),
            stage: ResolutionStage::Boundary,
            was_corrected: false,
        }];
        write_output(&points, &assignments, &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,state,latitude,longitude,final_region,resolution_stage,was_corrected"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Springvale,VIC,-37.95,145.15,South East Melbourne,boundary,false"
        );
    }
}
