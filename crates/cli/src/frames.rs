//! Landmark stream files.
//!
//! Two layouts:
//! - Long table (`.csv`, `.parquet`): one row per landmark with columns
//!   `frame, index, x, y` and an optional `visibility`. Read and written with polars.
//! - JSON lines (`.jsonl`, `.json`): one serialized `LandmarkFrame` per line.
//!
//! In the long layout, missing indices inside a frame truncate it at the first
//! gap, so the engine sees the same "too few landmarks" case as a live occlusion.
//! Frame ids with no rows at all between the first and last id become empty
//! frames, which keeps replay timing intact. Duplicate `(frame, index)` rows keep
//! the first occurrence.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use repcount::landmarks::{Landmark, LandmarkFrame};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Upper bound on frames rebuilt from one long table.
const MAX_FRAMES: usize = 10_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Parquet,
    JsonLines,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Format::Csv),
            Some("parquet") => Ok(Format::Parquet),
            Some("jsonl") | Some("json") => Ok(Format::JsonLines),
            _ => bail!(
                "unsupported frames file {} (expected .csv, .parquet or .jsonl)",
                path.display()
            ),
        }
    }
}

pub fn load(path: &Path) -> Result<Vec<LandmarkFrame>> {
    let frames = match Format::from_path(path)? {
        Format::Csv => {
            let df = LazyCsvReader::new(path)
                .with_infer_schema_length(Some(100))
                .finish()?
                .collect()
                .with_context(|| format!("reading {}", path.display()))?;
            from_long_table(&df)?
        }
        Format::Parquet => {
            let df = LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
                .collect()
                .with_context(|| format!("reading {}", path.display()))?;
            from_long_table(&df)?
        }
        Format::JsonLines => read_json_lines(path)?,
    };
    tracing::info!(frames = frames.len(), path = %path.display(), "frames loaded");
    Ok(frames)
}

pub fn save(path: &Path, frames: &[LandmarkFrame]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let format = Format::from_path(path)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match format {
        Format::Csv => {
            let mut df = to_long_table(frames)?;
            CsvWriter::new(BufWriter::new(file)).finish(&mut df)?;
        }
        Format::Parquet => {
            let mut df = to_long_table(frames)?;
            ParquetWriter::new(file).finish(&mut df)?;
        }
        Format::JsonLines => {
            let mut w = BufWriter::new(file);
            for frame in frames {
                serde_json::to_writer(&mut w, frame)?;
                w.write_all(b"\n")?;
            }
            w.flush()?;
        }
    }
    Ok(())
}

fn read_json_lines(path: &Path) -> Result<Vec<LandmarkFrame>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: LandmarkFrame = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
        out.push(frame);
    }
    Ok(out)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column `{name}`"))?
        .cast(&DataType::Float64)?;
    Ok(s.f64()?.into_iter().collect())
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column `{name}`"))?
        .cast(&DataType::Int64)?;
    Ok(s.i64()?.into_iter().collect())
}

/// Group long-format rows into frames ordered by frame id.
pub fn from_long_table(df: &DataFrame) -> Result<Vec<LandmarkFrame>> {
    let frame_ids = int_column(df, "frame")?;
    let indices = int_column(df, "index")?;
    let xs = float_column(df, "x")?;
    let ys = float_column(df, "y")?;
    let vis = if df.column("visibility").is_ok() {
        float_column(df, "visibility")?
    } else {
        vec![None; df.height()]
    };

    let mut grouped: BTreeMap<i64, BTreeMap<usize, Landmark>> = BTreeMap::new();
    let mut duplicates = 0usize;
    for row in 0..df.height() {
        let (Some(fid), Some(idx)) = (frame_ids[row], indices[row]) else {
            bail!("row {row}: null frame or index");
        };
        let idx = usize::try_from(idx).with_context(|| format!("row {row}: negative index"))?;
        // Null coordinates become NaN, which the engine rejects per frame.
        let lm = Landmark {
            x: xs[row].unwrap_or(f64::NAN),
            y: ys[row].unwrap_or(f64::NAN),
            visibility: vis[row],
        };
        match grouped.entry(fid).or_default().entry(idx) {
            Entry::Vacant(slot) => {
                slot.insert(lm);
            }
            Entry::Occupied(_) => {
                duplicates += 1;
                tracing::debug!(frame = fid, index = idx, row, "duplicate landmark row ignored");
            }
        }
    }
    if duplicates > 0 {
        tracing::warn!(duplicates, "duplicate landmark rows ignored");
    }

    let (Some(&first), Some(&last)) = (grouped.keys().next(), grouped.keys().next_back()) else {
        return Ok(Vec::new());
    };
    let span = last
        .checked_sub(first)
        .and_then(|d| usize::try_from(d).ok())
        .and_then(|d| d.checked_add(1))
        .filter(|&n| n <= MAX_FRAMES)
        .with_context(|| format!("frame ids {first}..={last} span too many frames"))?;
    let missing = span - grouped.len();
    if missing > 0 {
        tracing::debug!(missing, "frame ids without rows replayed as empty frames");
    }

    Ok((first..=last)
        .map(|fid| {
            let landmarks = grouped
                .remove(&fid)
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .take_while(|(expected, (idx, _))| expected == idx)
                .map(|(_, (_, lm))| lm)
                .collect();
            LandmarkFrame::new(landmarks)
        })
        .collect())
}

pub fn to_long_table(frames: &[LandmarkFrame]) -> Result<DataFrame> {
    let rows: usize = frames.iter().map(LandmarkFrame::len).sum();
    let mut frame_col = Vec::with_capacity(rows);
    let mut index_col = Vec::with_capacity(rows);
    let mut x_col = Vec::with_capacity(rows);
    let mut y_col = Vec::with_capacity(rows);
    let mut vis_col: Vec<Option<f64>> = Vec::with_capacity(rows);
    for (fid, frame) in frames.iter().enumerate() {
        for (idx, lm) in frame.landmarks.iter().enumerate() {
            frame_col.push(fid as u32);
            index_col.push(idx as u32);
            x_col.push(lm.x);
            y_col.push(lm.y);
            vis_col.push(lm.visibility);
        }
    }
    Ok(polars::df!(
        "frame" => frame_col,
        "index" => index_col,
        "x" => x_col,
        "y" => y_col,
        "visibility" => vis_col
    )?)
}
