// ------------------------------------------------------------
// Trajectory table: loading and writing
//
// Fixed-base rows: theta_1 .. theta_N, action, reward
// Cart rows:       theta_1 .. theta_N, x_cart, action, reward
// The first row is a header and is discarded.
// ------------------------------------------------------------

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::config::ColumnLayout;
use crate::error::{RenderError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    layout: ColumnLayout,
    // One row of N relative joint angles per frame (radians).
    angles: Vec<Vec<f64>>,
    // All zeros in fixed-base mode.
    cart_x: Vec<f64>,
    actions: Vec<f64>,
    rewards: Vec<f64>,
}

impl Trajectory {
    pub fn load(path: &Path, layout: ColumnLayout) -> Result<Self> {
        let file = File::open(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trajectory = Self::from_reader(file, layout)?;
        debug!(
            "loaded {} frames ({} rods, {}) from {}",
            trajectory.len(),
            layout.num_rods,
            layout.mode(),
            path.display()
        );
        Ok(trajectory)
    }

    pub fn from_reader<R: Read>(reader: R, layout: ColumnLayout) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let expected = layout.expected_columns();
        let mut angles = Vec::new();
        let mut cart_x = Vec::new();
        let mut actions = Vec::new();
        let mut rewards = Vec::new();

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());

            if record.len() != expected {
                return Err(RenderError::ColumnCount {
                    line,
                    expected,
                    actual: record.len(),
                    mode: layout.mode(),
                });
            }

            let mut row = Vec::with_capacity(expected);
            for (column, cell) in record.iter().enumerate() {
                // inf / NaN parse as f64 but cannot be plotted.
                let value = cell
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| RenderError::Parse {
                        line,
                        column: column + 1,
                        value: cell.to_string(),
                    })?;
                row.push(value);
            }

            angles.push(row[..layout.num_rods].to_vec());
            cart_x.push(if layout.use_cart {
                row[layout.num_rods]
            } else {
                0.0
            });
            actions.push(row[layout.action_column()]);
            rewards.push(row[layout.reward_column()]);
        }

        if angles.is_empty() {
            return Err(RenderError::EmptyTrajectory);
        }

        Ok(Self {
            layout,
            angles,
            cart_x,
            actions,
            rewards,
        })
    }

    // Build from in-memory columns. `cart_x` is ignored in fixed-base mode.
    pub fn from_columns(
        layout: ColumnLayout,
        angles: Vec<Vec<f64>>,
        cart_x: Option<Vec<f64>>,
        actions: Vec<f64>,
        rewards: Vec<f64>,
    ) -> Result<Self> {
        let n = angles.len();
        if n == 0 {
            return Err(RenderError::EmptyTrajectory);
        }
        if actions.len() != n || rewards.len() != n {
            return Err(RenderError::InvalidConfig(format!(
                "column lengths differ: {} angle rows, {} actions, {} rewards",
                n,
                actions.len(),
                rewards.len()
            )));
        }
        if let Some(frame) = angles.iter().position(|a| a.len() != layout.num_rods) {
            return Err(RenderError::ColumnCount {
                line: frame as u64 + 2,
                expected: layout.expected_columns(),
                actual: angles[frame].len() + layout.expected_columns() - layout.num_rods,
                mode: layout.mode(),
            });
        }

        let finite = |values: &[f64]| values.iter().all(|v| v.is_finite());
        if !angles.iter().all(|a| finite(a))
            || !finite(&actions)
            || !finite(&rewards)
            || !cart_x.as_deref().map_or(true, finite)
        {
            return Err(RenderError::InvalidConfig(
                "trajectory values must be finite".to_string(),
            ));
        }

        let cart_x = match (layout.use_cart, cart_x) {
            (true, Some(x)) if x.len() == n => x,
            (true, Some(x)) => {
                return Err(RenderError::InvalidConfig(format!(
                    "column lengths differ: {} angle rows, {} cart positions",
                    n,
                    x.len()
                )))
            }
            (true, None) => {
                return Err(RenderError::InvalidConfig(
                    "cart mode needs cart positions".to_string(),
                ))
            }
            (false, _) => vec![0.0; n],
        };

        Ok(Self {
            layout,
            angles,
            cart_x,
            actions,
            rewards,
        })
    }

    // Write the table in the same schema `load` reads.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        let mut header: Vec<String> = (1..=self.layout.num_rods)
            .map(|i| format!("theta_{i}"))
            .collect();
        if self.layout.use_cart {
            header.push("x_cart".to_string());
        }
        header.push("action".to_string());
        header.push("reward".to_string());
        wtr.write_record(&header)?;

        for f in 0..self.len() {
            let mut row: Vec<String> = self.angles[f].iter().map(|a| a.to_string()).collect();
            if self.layout.use_cart {
                row.push(self.cart_x[f].to_string());
            }
            row.push(self.actions[f].to_string());
            row.push(self.rewards[f].to_string());
            wtr.write_record(&row)?;
        }
        wtr.flush().map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn angles(&self, frame: usize) -> &[f64] {
        &self.angles[frame]
    }

    pub fn cart_x(&self, frame: usize) -> f64 {
        self.cart_x[frame]
    }

    pub fn actions(&self) -> &[f64] {
        &self.actions
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }
}

// Min/max of a non-empty series.
pub fn series_bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BaseMode;

    fn parse(text: &str, num_rods: usize, use_cart: bool) -> Result<Trajectory> {
        Trajectory::from_reader(text.as_bytes(), ColumnLayout::new(num_rods, use_cart))
    }

    #[test]
    fn fixed_base_columns_are_split() {
        let t = parse(
            "theta_1,theta_2,action,reward\n0.1,0.2,1.0,-1.0\n0.3,0.4,2.0,-2.0\n",
            2,
            false,
        )
        .unwrap();

        assert_eq!(t.len(), 2);
        assert_eq!(t.angles(1), &[0.3, 0.4]);
        assert_eq!(t.cart_x(0), 0.0);
        assert_eq!(t.cart_x(1), 0.0);
        assert_eq!(t.actions(), &[1.0, 2.0]);
        assert_eq!(t.rewards(), &[-1.0, -2.0]);
    }

    #[test]
    fn cart_column_sits_between_angles_and_action() {
        let t = parse("a,x,u,r\n0.5, 1.25, 3.0, 4.0\n", 1, true).unwrap();
        assert_eq!(t.angles(0), &[0.5]);
        assert_eq!(t.cart_x(0), 1.25);
        assert_eq!(t.actions(), &[3.0]);
        assert_eq!(t.rewards(), &[4.0]);
    }

    #[test]
    fn column_count_mismatch_names_counts_and_mode() {
        let err = parse("a,b,c,d\n0,0,0,0\n", 2, true).unwrap_err();
        match &err {
            RenderError::ColumnCount {
                expected,
                actual,
                mode,
                line,
            } => {
                assert_eq!(*expected, 5);
                assert_eq!(*actual, 4);
                assert_eq!(*mode, BaseMode::Cart);
                assert_eq!(*line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("expected 5, got 4, cart-based mode"));
    }

    #[test]
    fn every_row_is_shape_checked() {
        let err = parse("a,u,r\n0,0,0\n0,0\n", 1, false).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ColumnCount {
                line: 3,
                expected: 3,
                actual: 2,
                mode: BaseMode::Fixed
            }
        ));
    }

    #[test]
    fn non_numeric_cell_is_reported() {
        let err = parse("a,u,r\n0,oops,0\n", 1, false).unwrap_err();
        match err {
            RenderError::Parse { column, value, .. } => {
                assert_eq!(column, 2);
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn infinite_cell_is_rejected() {
        let err = parse("a,u,r\n0,0.5,1\n0,inf,1\n", 1, false).unwrap_err();
        match err {
            RenderError::Parse {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, 2);
                assert_eq!(value, "inf");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nan_column_is_rejected() {
        let err = parse("a,u,r\n0,0,NaN\n0,0,nan\n", 1, false).unwrap_err();
        assert!(matches!(err, RenderError::Parse { line: 2, column: 3, .. }));

        let err = parse("a,x,u,r\n0,-infinity,0,0\n", 1, true).unwrap_err();
        assert!(matches!(err, RenderError::Parse { column: 2, .. }));
    }

    #[test]
    fn from_columns_rejects_non_finite_values() {
        let layout = ColumnLayout::new(1, false);
        let err = Trajectory::from_columns(
            layout,
            vec![vec![0.0], vec![0.0]],
            None,
            vec![f64::INFINITY, 0.5],
            vec![0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));

        let err = Trajectory::from_columns(
            layout,
            vec![vec![0.0], vec![0.0]],
            None,
            vec![0.0, 0.0],
            vec![f64::NAN, f64::NAN],
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse("a,u,r\n", 1, false).unwrap_err();
        assert!(matches!(err, RenderError::EmptyTrajectory));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Trajectory::load(
            Path::new("definitely/not/here/trajectory.csv"),
            ColumnLayout::new(1, false),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn written_table_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.csv");
        let layout = ColumnLayout::new(2, true);
        let t = Trajectory::from_columns(
            layout,
            vec![vec![0.1, -0.2], vec![0.3, 0.4]],
            Some(vec![0.5, -0.5]),
            vec![1.0, 2.0],
            vec![0.0, 1.5],
        )
        .unwrap();

        t.write_csv(&path).unwrap();
        assert_eq!(Trajectory::load(&path, layout).unwrap(), t);
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let layout = ColumnLayout::new(2, false);
        let err = Trajectory::from_columns(
            layout,
            vec![vec![0.0, 0.0], vec![0.0]],
            None,
            vec![0.0, 0.0],
            vec![0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::ColumnCount { actual: 3, .. }));

        let err = Trajectory::from_columns(
            ColumnLayout::new(1, true),
            vec![vec![0.0]],
            None,
            vec![0.0],
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
    }

    #[test]
    fn bounds_cover_the_series() {
        assert_eq!(series_bounds(&[0.3, -1.0, 2.5]), (-1.0, 2.5));
    }
}
