use crossterm::event::Event;
use ratatui::{prelude::*, widgets::*};

use crate::{
    algo::tabular::q_learning::StepReport,
    gym::{
        planner::{Dir, Pos, EAST, NORTH, SOUTH},
        smartcab::Snapshot,
    },
};

use super::Component;

fn arrow(heading: Dir) -> &'static str {
    match heading {
        NORTH => "▲",
        EAST => "▶",
        SOUTH => "▼",
        _ => "◀",
    }
}

/// Top-down view of the grid with the learning car's latest step beside it
///
/// Each intersection shows the car on it, if any, followed by its light: `|` while
/// north-south traffic has the green, `-` otherwise.
#[derive(Default)]
pub struct World {
    latest: Option<(Snapshot, StepReport)>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, snapshot: Snapshot, report: StepReport) {
        self.latest = Some((snapshot, report));
    }

    fn cell(snapshot: &Snapshot, location: Pos) -> Span<'static> {
        match snapshot.cars.iter().position(|car| car.location == location) {
            Some(0) => Span::from(arrow(snapshot.cars[0].heading)).light_yellow().bold(),
            Some(i) => Span::from(arrow(snapshot.cars[i].heading)).white(),
            None if location == snapshot.destination => Span::from("D").light_red().bold(),
            None => Span::from("·").dark_gray(),
        }
    }

    fn grid_lines(snapshot: &Snapshot) -> Vec<Line<'static>> {
        let (w, h) = snapshot.grid_size;
        (1..=h)
            .map(|y| {
                let spans = (1..=w).flat_map(|x| {
                    let north_south = snapshot.lights[((y - 1) * w + (x - 1)) as usize];
                    let light = if north_south { "| " } else { "- " };
                    [
                        Span::raw(" "),
                        Self::cell(snapshot, (x, y)),
                        Span::from(light).green(),
                    ]
                });
                Line::from(spans.collect::<Vec<_>>())
            })
            .collect()
    }

    fn status_lines(snapshot: &Snapshot, report: &StepReport) -> Vec<Line<'static>> {
        let field = |name: &str, value: String| {
            Line::from(vec![
                Span::from(format!("{name:>12}: ")).light_cyan(),
                Span::raw(value),
            ])
        };
        let percept = report.percept;
        vec![
            field("t", snapshot.t.to_string()),
            field("deadline", snapshot.deadline.to_string()),
            field("destination", format!("{:?}", snapshot.destination)),
            field("light", percept.light.to_string()),
            field("oncoming", percept.oncoming.to_string()),
            field("left", percept.left.to_string()),
            field("right", percept.right.to_string()),
            field("waypoint", report.state.waypoint().to_string()),
            field("action", format!("{} ({:?})", report.action, report.choice)),
            field("reward", format!("{:.1}", report.reward)),
        ]
    }
}

impl WidgetRef for World {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [grid_area, status_area] =
            Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(area);

        let grid_block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("World")
            .padding(Padding::uniform(1));
        let status_block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Agent");

        let Some((snapshot, report)) = &self.latest else {
            Paragraph::new("Waiting for the first step...")
                .block(grid_block)
                .render(grid_area, buf);
            status_block.render(status_area, buf);
            return;
        };

        Paragraph::new(Self::grid_lines(snapshot))
            .block(grid_block)
            .render(grid_area, buf);
        Paragraph::new(Self::status_lines(snapshot, report))
            .block(status_block)
            .render(status_area, buf);
    }
}

impl Component for World {
    fn handle_ui_event(&mut self, _event: &Event) -> bool {
        false
    }
}
