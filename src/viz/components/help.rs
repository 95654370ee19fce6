use ratatui::{prelude::*, widgets::*};

const GLOBAL_KEYS: &[(&str, &str)] = &[
    ("q", "Stop the simulation and exit"),
    ("h", "Show or hide this help"),
    ("Tab", "Next tab"),
];

const PLOT_KEYS: &[(&str, &str)] = &[("← / →", "Previous / next metric")];

const LOG_KEYS: &[(&str, &str)] = &[
    ("↑ / ↓", "Select a log target"),
    ("← / →", "Show fewer / more levels for the target"),
    ("- / +", "Capture fewer / more levels for the target"),
    ("s", "Show or hide the target list"),
    ("f", "Only show the selected target"),
    ("Space", "Show or hide targets that are switched off"),
    ("PgUp / PgDn", "Scroll through the history"),
    ("Esc", "Back to following new messages"),
];

fn key_line<'a>(key: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::from(format!("{key:>11}")).light_cyan().bold(),
        Span::raw("  "),
        Span::raw(action),
    ])
}

/// What the symbols on the World tab stand for
fn legend() -> Vec<Line<'static>> {
    [
        (Span::from("▲").light_yellow().bold(), "The learning cab, pointing where it heads"),
        (Span::from("▲").white(), "Other traffic"),
        (Span::from("D").light_red().bold(), "Destination of the current trial"),
        (Span::from("|").green(), "Light open to north-south traffic"),
        (Span::from("-").green(), "Light open to east-west traffic"),
    ]
    .into_iter()
    .map(|(symbol, meaning)| {
        Line::from(vec![
            Span::raw(" ".repeat(10)),
            symbol,
            Span::raw("  "),
            Span::raw(meaning),
        ])
    })
    .collect()
}

/// Draw a popup with the keys of the selected tab over `area`
pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize) {
    let mut lines = GLOBAL_KEYS
        .iter()
        .map(|&(key, action)| key_line(key, action))
        .collect::<Vec<_>>();
    lines.push(Line::default());
    match selected_tab {
        0 => lines.extend(legend()),
        1 => lines.extend(PLOT_KEYS.iter().map(|&(key, action)| key_line(key, action))),
        _ => lines.extend(LOG_KEYS.iter().map(|&(key, action)| key_line(key, action))),
    }

    let height = lines.len() as u16 + 4;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(72) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width.min(72),
        height: area.height.min(height),
    };

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::uniform(1))
                .title("Help"),
        )
        .render(popup, buf);
}
