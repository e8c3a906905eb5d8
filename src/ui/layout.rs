//! Column width distribution.

use thiserror::Error;

use crate::config::ColumnSpec;

/// A realized table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: String,
    pub width: u16,
}

/// Reasons no layout can be produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("no enabled columns")]
    NoEnabledColumns,

    #[error("width {width} leaves no room after a margin of {margin}")]
    TooNarrow { width: u16, margin: u16 },
}

/// Split `total_width - margin` between the enabled columns by weight.
///
/// Each width is rounded on its own, so the sum can be off from the
/// available width by up to one cell per column.
pub fn compute_columns(
    specs: &[ColumnSpec],
    total_width: u16,
    margin: u16,
) -> Result<Vec<ColumnLayout>, LayoutError> {
    if total_width <= margin {
        return Err(LayoutError::TooNarrow {
            width: total_width,
            margin,
        });
    }

    let total_weight: f64 = specs.iter().filter(|s| s.enabled).map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return Err(LayoutError::NoEnabledColumns);
    }

    let available = f64::from(total_width - margin);
    Ok(specs
        .iter()
        .filter(|s| s.enabled)
        .map(|s| ColumnLayout {
            name: s.name.clone(),
            width: (s.weight * available / total_weight).round() as u16,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_columns, ColumnSource};

    fn widths(layout: &[ColumnLayout]) -> Vec<u16> {
        layout.iter().map(|c| c.width).collect()
    }

    #[test]
    fn test_default_columns_at_110() {
        // 100 cells split 0.2 : 0.3 : 0.2
        let layout = compute_columns(&default_columns(), 110, 10).unwrap();
        let names: Vec<_> = layout.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["File", "Title", "Album"]);
        assert_eq!(widths(&layout), vec![29, 43, 29]);
    }

    #[test]
    fn test_disabled_columns_get_no_share() {
        let mut specs = default_columns();
        specs[1].enabled = false;
        let layout = compute_columns(&specs, 50, 10).unwrap();

        assert_eq!(widths(&layout), vec![20, 20]);
    }

    #[test]
    fn test_rounding_slack_is_bounded() {
        let specs = vec![
            ColumnSpec::new("a", 0.13, true, ColumnSource::FilePath),
            ColumnSpec::new("b", 0.29, true, ColumnSource::FilePath),
            ColumnSpec::new("c", 0.07, false, ColumnSource::FilePath),
            ColumnSpec::new("d", 0.41, true, ColumnSource::FilePath),
            ColumnSpec::new("e", 0.17, true, ColumnSource::FilePath),
        ];
        let enabled = specs.iter().filter(|s| s.enabled).count() as i64;

        for width in 20..=400u16 {
            let layout = compute_columns(&specs, width, 10).unwrap();
            let sum: i64 = layout.iter().map(|c| i64::from(c.width)).sum();
            let available = i64::from(width - 10);
            assert!(
                (sum - available).abs() <= enabled,
                "width {width}: columns sum to {sum}, available {available}"
            );
        }
    }

    #[test]
    fn test_no_enabled_columns() {
        let mut specs = default_columns();
        for spec in &mut specs {
            spec.enabled = false;
        }
        assert_eq!(
            compute_columns(&specs, 80, 10),
            Err(LayoutError::NoEnabledColumns)
        );
    }

    #[test]
    fn test_too_narrow() {
        assert_eq!(
            compute_columns(&default_columns(), 10, 10),
            Err(LayoutError::TooNarrow {
                width: 10,
                margin: 10
            })
        );
    }
}
