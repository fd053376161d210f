use super::model::Table;

/// At most this many numeric columns are charted.
pub const MAX_CHART_SERIES: usize = 5;

/// One numeric column prepared for the bar chart, keyed by row position.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// The first [`MAX_CHART_SERIES`] numeric columns in current column order.
pub fn chart_series(table: &Table) -> Vec<ChartSeries> {
    table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .take(MAX_CHART_SERIES)
        .map(|c| ChartSeries {
            name: c.name.clone(),
            values: c.values.iter().map(|v| v.as_f64()).collect(),
        })
        .collect()
}
