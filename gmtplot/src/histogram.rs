//! The `histogram` module: plots a histogram of one column of a table.
//!
//! Binning and rendering happen in the engine. This module only names the
//! options and forwards them.

use gmtplot_common::OptionValue;
use gmtplot_session::Table;
use lazy_static::lazy_static;

use crate::alias::{ModuleSpec, OptionAlias, OptionKind};
use crate::args::Options;
use crate::error::GmtPlotError;
use crate::figure::Figure;

lazy_static! {
    pub static ref HISTOGRAM: ModuleSpec = ModuleSpec::new(
        "histogram",
        [
            OptionAlias::new(
                "horizontal",
                'A',
                OptionKind::Flag,
                "Plot horizontal bars instead of vertical ones",
            ),
            OptionAlias::new(
                "frame",
                'B',
                OptionKind::Text,
                "Frame and axes settings; a list writes one -B per entry",
            )
            .repeatable(),
            OptionAlias::new("cmap", 'C', OptionKind::Text, "Color palette for the bars"),
            OptionAlias::new(
                "annotate",
                'D',
                OptionKind::FlagOrText,
                "Label each bar with its count [+b][+f<font>][+o<off>][+r]",
            ),
            OptionAlias::new(
                "barwidth",
                'E',
                OptionKind::Scalar,
                "Bar width in data or plot units, with optional +o<offset>",
            ),
            OptionAlias::new(
                "center",
                'F',
                OptionKind::Flag,
                "Center bins on each value instead of the left edge",
            ),
            OptionAlias::new("fill", 'G', OptionKind::Text, "Bar fill"),
            OptionAlias::new("projection", 'J', OptionKind::Text, "Map projection"),
            OptionAlias::new(
                "normal",
                'N',
                OptionKind::FlagOrScalar,
                "Overlay a normal distribution: mode 0 mean, 1 median, 2 LMS [+p<pen>]",
            )
            .repeatable(),
            OptionAlias::new(
                "cumulative",
                'Q',
                OptionKind::FlagOrText,
                "Cumulative histogram; r for reverse cumulative",
            ),
            OptionAlias::new(
                "region",
                'R',
                OptionKind::Joined,
                "Plot region xmin/xmax/ymin/ymax",
            ),
            OptionAlias::new(
                "step",
                'S',
                OptionKind::Flag,
                "Draw a stairs-step outline without internal bars",
            ),
            OptionAlias::new(
                "series",
                'T',
                OptionKind::Joined,
                "Bin interval [min/max/]inc[+n]",
            ),
            OptionAlias::new("pen", 'W', OptionKind::Text, "Bar outline pen"),
            OptionAlias::new("xshift", 'X', OptionKind::Text, "Shift the plot origin in x"),
            OptionAlias::new("yshift", 'Y', OptionKind::Text, "Shift the plot origin in y"),
            OptionAlias::new(
                "type",
                'Z',
                OptionKind::Scalar,
                "Histogram type 0-5 (counts, percent, log and log10 forms) [+w]",
            ),
            OptionAlias::new("panel", 'c', OptionKind::Text, "Subplot panel to plot into"),
            OptionAlias::new("label", 'l', OptionKind::Text, "Legend entry"),
            OptionAlias::new(
                "perspective",
                'p',
                OptionKind::Text,
                "3-D view azimuth/elevation",
            ),
        ],
    );
}

/// Insertion-ordered builder for histogram options.
///
/// Names are not checked until the options are translated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramOptions {
    options: Options,
}

macro_rules! option_setters {
    ($($method:ident => $name:literal),* $(,)?) => {
        $(
            pub fn $method(self, value: impl Into<OptionValue>) -> Self {
                self.with_option($name, value)
            }
        )*
    };
}

impl HistogramOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option by name. Setting it again replaces the value in place.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    option_setters!(
        horizontal => "horizontal",
        frame => "frame",
        cmap => "cmap",
        annotate => "annotate",
        barwidth => "barwidth",
        center => "center",
        fill => "fill",
        projection => "projection",
        normal => "normal",
        cumulative => "cumulative",
        region => "region",
        step => "step",
        series => "series",
        pen => "pen",
        xshift => "xshift",
        yshift => "yshift",
        hist_type => "type",
        panel => "panel",
        label => "label",
        perspective => "perspective",
    );

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl From<HistogramOptions> for Options {
    fn from(value: HistogramOptions) -> Self {
        value.options
    }
}

impl Figure {
    /// Plot a histogram of `table`.
    ///
    /// `table` is a file the engine reads directly, or in-memory columns that
    /// are staged for the call. Option names are those of [`struct@HISTOGRAM`].
    pub fn histogram(&self, table: &Table, options: &Options) -> Result<(), GmtPlotError> {
        self.call_module(&HISTOGRAM, table, options)
    }
}
