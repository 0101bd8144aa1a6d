use crate::align::{EquityCurvePair, align};
use crate::drawdown::drawdown;
use crate::error::AnalyticsError;
use crate::missing::clean;
use crate::period::aggregate;
use crate::report::{IndexReport, MovingAverage};
use crate::returns::daily_returns;
use crate::rolling::{bollinger_bands, moving_average, rolling_volatility};
use configuration::AnalysisSettings;
use core_types::{Granularity, RawSeries, TimeSeries};

/// A stateless calculator that turns a raw index price series into every
/// derived series the report needs.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    settings: AnalysisSettings,
}

impl AnalyticsEngine {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// The main entry point: cleans `raw`, then derives all series from it.
    ///
    /// # Returns
    ///
    /// `Err` only when the raw series cannot be cleaned (its dates are out of
    /// order). Failures of individual components are recorded inside the
    /// returned `IndexReport`.
    pub fn analyze(&self, raw: &RawSeries) -> Result<IndexReport, AnalyticsError> {
        let close = clean(raw)?;
        Ok(self.analyze_clean(close))
    }

    /// Derives all series from an already cleaned price series.
    ///
    /// The components do not depend on one another, so they run in parallel.
    pub fn analyze_clean(&self, close: TimeSeries) -> IndexReport {
        let settings = &self.settings;
        let series = &close;

        let ((daily_returns, moving_averages), ((bollinger, volatility), (drawdown, (monthly_returns, yearly_returns)))) =
            rayon::join(
                || {
                    (
                        daily_returns(series),
                        settings
                            .moving_average_windows
                            .iter()
                            .map(|&window| MovingAverage {
                                window,
                                series: moving_average(series, window),
                            })
                            .collect::<Vec<_>>(),
                    )
                },
                || {
                    rayon::join(
                        || {
                            (
                                bollinger_bands(series, settings.bollinger.window, settings.bollinger.k),
                                rolling_volatility(
                                    series,
                                    settings.volatility.window,
                                    settings.volatility.periods_per_year,
                                ),
                            )
                        },
                        || {
                            (
                                drawdown(series),
                                rayon::join(
                                    || aggregate(series, Granularity::Month),
                                    || aggregate(series, Granularity::Year),
                                ),
                            )
                        },
                    )
                },
            );

        let report = IndexReport {
            close,
            daily_returns,
            moving_averages,
            bollinger,
            volatility,
            drawdown,
            monthly_returns,
            yearly_returns,
        };

        for (component, err) in report.failures() {
            tracing::error!(component = %component, error = %err, "Component computation failed");
        }
        tracing::info!(
            observations = report.close.len(),
            complete = report.is_complete(),
            "Index analysis finished"
        );

        report
    }

    /// Aligns a benchmark and a strategy equity curve on their shared dates.
    pub fn compare(&self, benchmark: &TimeSeries, strategy: &TimeSeries) -> EquityCurvePair {
        align(benchmark, strategy)
    }
}
