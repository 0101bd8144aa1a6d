use crate::drawdown::DrawdownSeries;
use crate::error::AnalyticsError;
use crate::period::PeriodReturn;
use crate::rolling::BollingerBands;
use core_types::TimeSeries;

/// A trailing moving average computed for one configured window.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    pub window: usize,
    pub series: Result<TimeSeries, AnalyticsError>,
}

/// Every derived series for one cleaned index price series.
///
/// Each component is computed independently and carries its own `Result`: a
/// failure in one (say, a zero close breaking the period returns) leaves all
/// the others intact.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    /// The cleaned closing prices all other series were derived from.
    pub close: TimeSeries,
    pub daily_returns: Result<TimeSeries, AnalyticsError>,
    pub moving_averages: Vec<MovingAverage>,
    pub bollinger: Result<BollingerBands, AnalyticsError>,
    pub volatility: Result<TimeSeries, AnalyticsError>,
    pub drawdown: Result<DrawdownSeries, AnalyticsError>,
    pub monthly_returns: Result<Vec<PeriodReturn>, AnalyticsError>,
    pub yearly_returns: Result<Vec<PeriodReturn>, AnalyticsError>,
}

impl IndexReport {
    /// The components that failed, labelled for display.
    pub fn failures(&self) -> Vec<(String, &AnalyticsError)> {
        let mut components = vec![("daily returns".to_string(), self.daily_returns.as_ref().err())];
        components.extend(self.moving_averages.iter().map(|ma| {
            (format!("{}-day moving average", ma.window), ma.series.as_ref().err())
        }));
        components.extend([
            ("bollinger bands".to_string(), self.bollinger.as_ref().err()),
            ("rolling volatility".to_string(), self.volatility.as_ref().err()),
            ("drawdown".to_string(), self.drawdown.as_ref().err()),
            ("monthly returns".to_string(), self.monthly_returns.as_ref().err()),
            ("yearly returns".to_string(), self.yearly_returns.as_ref().err()),
        ]);

        components
            .into_iter()
            .filter_map(|(label, err)| err.map(|err| (label, err)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }
}
