use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone};
use charming::{
    HtmlRenderer, ImageFormat, ImageRenderer,
    component::{Axis, Title},
    element::{AxisLabel, AxisType, LineStyle, SplitLine, Symbol, TextStyle, Tooltip, Trigger},
    series::Line,
};

use crate::{Period, StockError, Timeframe};

pub use charming::Chart;

const WIDTH: u32 = 1850;
const HEIGHT: u32 = 1050;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphProfile {
    pub label: &'static str,
    pub period: Period,
    pub interval: Timeframe,
    pub show_time: bool,
    pub show_date: bool,
}

const DAY: GraphProfile = GraphProfile {
    label: "day",
    period: Period::Day1,
    interval: Timeframe::Minute1,
    show_time: true,
    show_date: false,
};

const WEEK: GraphProfile = GraphProfile {
    label: "week",
    period: Period::Day5,
    interval: Timeframe::Minute5,
    show_time: true,
    show_date: true,
};

const MONTH: GraphProfile = GraphProfile {
    label: "month",
    period: Period::Month1,
    interval: Timeframe::Day1,
    show_time: true,
    show_date: true,
};

const HALF_YEAR: GraphProfile = GraphProfile {
    label: "halfyear",
    period: Period::Month6,
    interval: Timeframe::Day1,
    show_time: false,
    show_date: true,
};

const YEAR: GraphProfile = GraphProfile {
    label: "year",
    period: Period::Year1,
    interval: Timeframe::Day5,
    show_time: false,
    show_date: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Day,
    Week,
    Month,
    HalfYear,
    Year,
}

impl GraphKind {
    pub const ALL: [GraphKind; 5] = [
        GraphKind::Day,
        GraphKind::Week,
        GraphKind::Month,
        GraphKind::HalfYear,
        GraphKind::Year,
    ];

    pub fn profile(&self) -> &'static GraphProfile {
        match self {
            GraphKind::Day => &DAY,
            GraphKind::Week => &WEEK,
            GraphKind::Month => &MONTH,
            GraphKind::HalfYear => &HALF_YEAR,
            GraphKind::Year => &YEAR,
        }
    }

    /// Comma separated list of the accepted keys, for usage messages.
    pub fn keys() -> String {
        Self::ALL
            .iter()
            .map(|k| k.profile().label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGraphKind(pub String);

impl fmt::Display for UnknownGraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown period \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownGraphKind {}

impl FromStr for GraphKind {
    type Err = UnknownGraphKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.profile().label == key)
            .ok_or(UnknownGraphKind(key))
    }
}

/// Replace gaps with the last known value. A gap before any known value
/// becomes 0.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<f64> {
    let mut prev = 0.0;
    values
        .iter()
        .map(|&v| {
            if let Some(x) = v.filter(|x| !x.is_nan()) {
                prev = x;
            }
            prev
        })
        .collect()
}

/// Axis label for a sample, e.g. `03 Jun 2024 - 15:30`.
pub fn axis_label<Tz>(timestamp: &DateTime<Tz>, profile: &GraphProfile) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match (profile.show_date, profile.show_time) {
        (true, true) => timestamp.format("%d %b %Y - %H:%M").to_string(),
        (true, false) => timestamp.format("%d %b %Y").to_string(),
        (false, true) => timestamp.format("%H:%M").to_string(),
        (false, false) => String::new(),
    }
}

pub fn build_chart(title: &str, labels: Vec<String>, closes: Vec<f64>) -> Chart {
    Chart::new()
        .background_color("#0b0c17")
        .title(
            Title::new()
                .text(title)
                .left("center")
                .top("2%")
                .text_style(TextStyle::new().color("#ffffff").font_size(16)),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(labels)
                .axis_label(AxisLabel::new().rotate(30).interval(4).color("#a0a0a0"))
                .split_line(SplitLine::new().line_style(LineStyle::new().color("#2d2f45"))),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .scale(true)
                .axis_label(AxisLabel::new().color("#a0a0a0"))
                .split_line(SplitLine::new().line_style(LineStyle::new().color("#2d2f45"))),
        )
        .series(
            Line::new()
                .name("Close")
                .data(closes)
                .symbol(Symbol::None)
                .line_style(LineStyle::new().width(2).color("#00d084")),
        )
}

/// Self-contained page with the interactive chart.
pub fn render_html(title: &str, chart: &Chart) -> Result<String, StockError> {
    let renderer = HtmlRenderer::new(title, WIDTH as u64, HEIGHT as u64);
    Ok(renderer.render(chart)?)
}

pub fn render_png(chart: &Chart) -> Result<Vec<u8>, StockError> {
    let mut renderer = ImageRenderer::new(WIDTH, HEIGHT);
    Ok(renderer.render_format(ImageFormat::Png, chart)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn profiles_match_their_keys() {
        let expected = [
            ("day", "1d", "1m", true, false),
            ("week", "5d", "5m", true, true),
            ("month", "1mo", "1d", true, true),
            ("halfyear", "6mo", "1d", false, true),
            ("year", "1y", "5d", false, true),
        ];

        for (key, period, interval, show_time, show_date) in expected {
            let kind: GraphKind = key.parse().expect("known key");
            let p = kind.profile();
            assert_eq!(p.label, key);
            assert_eq!(p.period.as_str(), period);
            assert_eq!(p.interval.as_str(), interval);
            assert_eq!(p.show_time, show_time, "{key} show_time");
            assert_eq!(p.show_date, show_date, "{key} show_date");
        }
    }

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!("HalfYear".parse::<GraphKind>(), Ok(GraphKind::HalfYear));
        assert_eq!(
            "decade".parse::<GraphKind>(),
            Err(UnknownGraphKind("decade".to_string()))
        );
    }

    #[test]
    fn keys_list_every_period() {
        assert_eq!(GraphKind::keys(), "day, week, month, halfyear, year");
    }

    #[test]
    fn forward_fill_uses_previous_sample() {
        let filled = forward_fill(&[Some(1.0), None, Some(3.0), None, None]);
        assert_eq!(filled, vec![1.0, 1.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn forward_fill_leading_gap_is_zero() {
        let filled = forward_fill(&[None, Some(f64::NAN), Some(2.5)]);
        assert_eq!(filled, vec![0.0, 0.0, 2.5]);
    }

    #[test]
    fn labels_follow_profile_flags() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 3, 15, 30, 0).unwrap();

        assert_eq!(axis_label(&ts, GraphKind::Day.profile()), "15:30");
        assert_eq!(axis_label(&ts, GraphKind::Week.profile()), "03 Jun 2024 - 15:30");
        assert_eq!(axis_label(&ts, GraphKind::Year.profile()), "03 Jun 2024");
    }

    #[test]
    fn labels_use_the_given_time_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 3, 15, 30, 0).unwrap();
        let local = ts.with_timezone(&chrono_tz::America::New_York);

        assert_eq!(axis_label(&local, GraphKind::Day.profile()), "11:30");
    }
}
