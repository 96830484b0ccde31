//! Chart-ready data derived from a comparison report.
//!
//! Pure data: rendering is left to whatever front end consumes the JSON.

use crate::comparison::{ComparisonReport, InstrumentComparison};

/// One (x, y) point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Abscissa.
    pub x: f64,
    /// Ordinate.
    pub y: f64,
}

/// Named point series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    /// Legend label.
    pub name: String,
    /// Points in drawing order.
    pub points: Vec<Point>,
}

impl Series {
    fn from_rows<'a>(
        name: &str,
        rows: impl Iterator<Item = &'a InstrumentComparison>,
        point: impl Fn(&InstrumentComparison) -> Option<Point>,
    ) -> Self {
        Self {
            name: name.to_string(),
            points: rows.filter_map(point).collect(),
        }
    }
}

/// One labelled bar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar {
    /// Category label.
    pub label: String,
    /// Bar height.
    pub value: f64,
}

/// Everything needed to draw the model comparison.
///
/// - `model_vs_market`: market price on x, model price on y, one series per model
/// - `strike_vs_price`: strike on x, price on y for market and both models
/// - `mae_bars`: mean absolute error per model
///
/// Only instruments included in the report's summary appear.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartData {
    /// Scatter of model against market.
    pub model_vs_market: Vec<Series>,
    /// Prices by strike, sorted by strike.
    pub strike_vs_price: Vec<Series>,
    /// MAE per model.
    pub mae_bars: Vec<Bar>,
}

impl ChartData {
    /// Build chart data from `report`.
    ///
    /// # Examples
    /// ```
    /// use pricer_report::{summarize, ChartData};
    ///
    /// let report = summarize(&[10.0, 5.0], &[11.0, 4.0], &[10.5, 5.5]).unwrap();
    /// let chart = ChartData::from_report(&report);
    /// assert_eq!(chart.model_vs_market[0].points.len(), 2);
    /// assert_eq!(chart.mae_bars[1].value, 0.5);
    /// // no strikes without observations
    /// assert!(chart.strike_vs_price[0].points.is_empty());
    /// ```
    pub fn from_report(report: &ComparisonReport) -> Self {
        let model_vs_market = vec![
            Series::from_rows("Black-Scholes", report.included(), |r| {
                Some(Point {
                    x: r.market,
                    y: r.black_scholes,
                })
            }),
            Series::from_rows("Heston", report.included(), |r| {
                Some(Point {
                    x: r.market,
                    y: r.heston,
                })
            }),
        ];

        let mut by_strike: Vec<&InstrumentComparison> =
            report.included().filter(|r| r.strike.is_some()).collect();
        by_strike.sort_by(|a, b| {
            a.strike
                .unwrap_or(f64::NAN)
                .total_cmp(&b.strike.unwrap_or(f64::NAN))
        });
        let at_strike = |price: fn(&InstrumentComparison) -> f64| {
            move |r: &InstrumentComparison| r.strike.map(|k| Point { x: k, y: price(r) })
        };
        let strike_vs_price = vec![
            Series::from_rows("Market", by_strike.iter().copied(), at_strike(|r| r.market)),
            Series::from_rows(
                "Black-Scholes",
                by_strike.iter().copied(),
                at_strike(|r| r.black_scholes),
            ),
            Series::from_rows("Heston", by_strike.iter().copied(), at_strike(|r| r.heston)),
        ];

        let mae_bars = vec![
            Bar {
                label: "Black-Scholes".to_string(),
                value: report.mae_bs,
            },
            Bar {
                label: "Heston".to_string(),
                value: report.mae_heston,
            },
        ];

        Self {
            model_vs_market,
            strike_vs_price,
            mae_bars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::summarize;

    #[test]
    fn test_excluded_rows_are_not_drawn() {
        let report = summarize(&[10.0, f64::NAN], &[11.0, 1.0], &[10.5, 1.0]).unwrap();
        let chart = ChartData::from_report(&report);
        assert_eq!(chart.model_vs_market[1].points, vec![Point { x: 10.0, y: 10.5 }]);
        assert_eq!(chart.mae_bars[0].label, "Black-Scholes");
        assert_eq!(chart.mae_bars[0].value, 1.0);
    }
}
