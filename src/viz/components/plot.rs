use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use crate::viz::util::event_keycode;

use super::Component;

fn axis_labels(bounds: [f64; 2]) -> Vec<String> {
    bounds.iter().map(|x| format!("{x:.1}")).collect()
}

/// Scatter plot of one metric against the trial number
pub struct Plot {
    y_title: String,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
}

impl Plot {
    pub fn new(y_title: &str, trials: u32) -> Self {
        Self {
            y_title: String::from(y_title),
            x_bounds: [0.0, trials.max(1) as f64],
            y_bounds: [f64::MAX, f64::MIN],
            data: Vec::new(),
        }
    }

    pub fn update(&mut self, point: (f64, f64)) {
        self.x_bounds[1] = self.x_bounds[1].max(point.0);
        self.y_bounds[0] = self.y_bounds[0].min(point.1);
        self.y_bounds[1] = self.y_bounds[1].max(point.1);
        self.data.push(point);
    }

    fn y_bounds(&self) -> [f64; 2] {
        match self.y_bounds {
            [lo, hi] if lo > hi => [0.0, 1.0],
            [lo, hi] if lo == hi => [lo - 1.0, hi + 1.0],
            bounds => bounds,
        }
    }
}

impl Widget for &Plot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .cyan()
            .data(&self.data);

        let x_axis = Axis::default()
            .title("Trial")
            .dark_gray()
            .labels(
                axis_labels(self.x_bounds)
                    .into_iter()
                    .map(|l| l.bold())
                    .collect(),
            )
            .bounds(self.x_bounds);

        let y_bounds = self.y_bounds();
        let y_axis = Axis::default()
            .title(self.y_title.as_str())
            .dark_gray()
            .labels(axis_labels(y_bounds).into_iter().map(|l| l.bold()).collect())
            .bounds(y_bounds);

        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Plots")
                    .padding(Padding::uniform(4)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// One plot per trial metric, switched with the arrow keys
pub struct Plots {
    plot_names: Vec<&'static str>,
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: Vec<&'static str>, trials: u32) -> Self {
        let plots = names.iter().map(|name| Plot::new(name, trials)).collect();
        Self {
            plot_names: names,
            plots,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.plot_names.len()
    }

    pub fn next_plot(&mut self) {
        self.selected = (self.selected + 1) % self.len()
    }

    pub fn prev_plot(&mut self) {
        let len = self.len();
        self.selected = (self.selected + len - 1) % len;
    }

    /// Add a point to every plot, `data` in the order of the plot names
    pub fn update(&mut self, trial: u32, data: &[f64]) {
        for (plot, metric) in self.plots.iter_mut().zip(data) {
            plot.update((trial as f64, *metric));
        }
    }
}

impl WidgetRef for Plots {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let Some(plot) = self.plots.get(self.selected) else {
            return;
        };
        plot.render(area, buf);

        Tabs::new(self.plot_names.iter().copied())
            .block(Block::default().padding(Padding::uniform(2)))
            .white()
            .highlight_style(Style::default().light_green())
            .select(self.selected)
            .render(area, buf);
    }
}

impl Component for Plots {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        if self.plots.is_empty() {
            return false;
        }
        match event_keycode(event) {
            Some(KeyCode::Left) => self.prev_plot(),
            Some(KeyCode::Right) => self.next_plot(),
            _ => return false,
        }
        true
    }
}
