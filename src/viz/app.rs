use std::{
    io,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{self, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{help::render_help, Component, Logs, Plots, World},
    tui,
    util::event_keycode,
    Update,
};

const TABS: [&str; 3] = ["World", "Plots", "Logs"];

/// Upper bound on updates applied between two frames
const MAX_UPDATES_PER_FRAME: usize = 1024;

#[derive(Default, PartialEq)]
pub enum State {
    #[default]
    Train,
    Done,
    Quit,
}

/// The root TUI component which holds the main app state and runs the render loop
pub struct App {
    state: State,
    trial: u32,
    total_trials: u32,
    selected_tab: usize,
    show_help: bool,
    world: World,
    plots: Plots,
    logs: Logs,
}

impl App {
    pub fn new(plots: &[&'static str], trials: u32) -> Self {
        Self {
            state: Default::default(),
            trial: 0,
            total_trials: trials,
            selected_tab: 0,
            show_help: false,
            world: World::new(),
            plots: Plots::new(plots.to_vec(), trials),
            logs: Logs::new(),
        }
    }

    fn receive(&mut self, rx: &Receiver<Update>) {
        for _ in 0..MAX_UPDATES_PER_FRAME {
            match rx.try_recv() {
                Ok(Update::Step { snapshot, report }) => self.world.update(snapshot, report),
                Ok(Update::Trial { trial, data }) => {
                    self.trial = trial + 1;
                    self.plots.update(trial, &data);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Simulation finished, keep showing the results until the user quits
                    self.state = State::Done;
                    break;
                }
            }
        }
    }

    /// Initialize the terminal and run the main loop
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::init()?;

        while self.state != State::Quit {
            if self.state == State::Train {
                self.receive(&rx);
            }

            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if !event::poll(Duration::from_millis(16))? {
                continue;
            }
            let event = event::read()?;
            let Some(key) = event_keycode(&event) else {
                continue;
            };
            match key {
                KeyCode::Char('q') => self.state = State::Quit,
                KeyCode::Char('h') => self.show_help = !self.show_help,
                KeyCode::Tab => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
                _ => {
                    let handled = match self.selected_tab {
                        0 => self.world.handle_ui_event(&event),
                        1 => self.plots.handle_ui_event(&event),
                        _ => self.logs.handle_ui_event(&event),
                    };
                    if !handled && key == KeyCode::Esc {
                        self.show_help = false;
                    }
                }
            }
        }

        tui::restore()
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layout
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        // Menu
        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        // Main
        match self.selected_tab {
            0 => self.world.render_ref(main_area, buf),
            1 => self.plots.render_ref(main_area, buf),
            _ => self.logs.render_ref(main_area, buf),
        }

        // Progress Bar
        let title = match self.state {
            State::Train => "Progress",
            _ => "Done (q to quit)",
        };
        let ratio = if self.total_trials == 0 {
            1.0
        } else {
            (self.trial as f64 / self.total_trials as f64).min(1.0)
        };
        Gauge::default()
            .block(Block::bordered().border_type(BorderType::Rounded).title(title))
            .gauge_style(Style::default().cyan())
            .ratio(ratio)
            .label(format!("{}/{}", self.trial, self.total_trials))
            .render(progress_area, buf);

        if self.show_help {
            render_help(area, buf, self.selected_tab);
        }
    }
}
