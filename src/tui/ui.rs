// ui rendering

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::core::model::ALL_LABEL;
use crate::tui::app::{App, ComposeTarget, LogLevel, Mode, Panel, Popup};
use crate::tui::theme::{Theme, ThemeKind};
use crate::{CrisisNotice, HELPLINE, Role};

const PREVIEW_CHARS: usize = 60;

pub fn render(frame: &mut Frame, app: &mut App) {
    let theme = &app.theme;

    // clear with bg color
    frame.render_widget(Clear, frame.area());
    frame.render_widget(Block::default().style(theme.base()), frame.area());

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // header
            Constraint::Min(10),   // content
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, main[0]);
    render_content(frame, app, main[1]);
    render_footer(frame, app, main[2]);

    match app.popup {
        Popup::Themes => render_theme_popup(frame, app),
        Popup::Identity => render_identity_popup(frame, app),
        Popup::Filter => render_filter_popup(frame, app),
        Popup::ConfirmDelete => render_confirm_popup(frame, app),
        Popup::None => {}
    }
}

fn panel_block<'a>(app: &App, panel: Panel, title: String) -> Block<'a> {
    let theme = &app.theme;
    let border_style = if app.panel == panel {
        theme.accent()
    } else {
        theme.border()
    };

    Block::default()
        .title(Span::styled(title, theme.title()))
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(theme.base())
}

fn render_header(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .style(theme.base());

    let mode_str = match app.mode {
        Mode::Normal => "normal",
        Mode::Insert => "insert",
    };

    let identity = crate::author_label(
        app.author.role,
        app.author.nickname.as_deref(),
        app.author.is_anonymous,
    );

    let lines = vec![
        Line::from(vec![
            Span::styled("FailForward 💬 ", theme.title()),
            Span::styled(
                "실패 프레임을 바꾸는 우리 – 학생 × 부모 × 또래 응원 플랫폼",
                theme.muted(),
            ),
        ]),
        Line::from(vec![
            Span::styled("| 나: ", theme.muted()),
            Span::styled(identity, theme.base()),
            Span::styled("  | 필터: ", theme.muted()),
            Span::styled(app.filter_summary(), theme.base()),
            Span::styled("  | Mode: ", theme.muted()),
            Span::styled(mode_str, theme.accent()),
        ]),
        Line::styled(HELPLINE, theme.warning()),
    ];

    let info = Paragraph::new(lines).block(block).style(theme.base());
    frame.render_widget(info, area);
}

fn render_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    let top_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let bottom_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_posts(frame, app, top_cols[0]);
    render_detail(frame, app, top_cols[1]);
    render_compose(frame, app, bottom_cols[0]);
    render_logs(frame, app, bottom_cols[1]);
}

fn render_footer(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;

    let parts = match app.mode {
        Mode::Insert => vec![
            Span::styled(" Enter ", theme.base().bg(theme.accent).fg(theme.bg)),
            Span::styled(" Submit ", theme.muted()),
            Span::styled("| ", theme.border()),
            Span::styled("^g ", theme.accent()),
            Span::styled("Category ", theme.muted()),
            Span::styled("^s ", theme.accent()),
            Span::styled("Share code ", theme.muted()),
            Span::styled("| ", theme.border()),
            Span::styled("Esc ", theme.accent()),
            Span::styled("Cancel ", theme.muted()),
        ],
        Mode::Normal => vec![
            Span::styled(" n ", theme.base().bg(theme.accent).fg(theme.bg)),
            Span::styled(" Post ", theme.muted()),
            Span::styled("| ", theme.border()),
            Span::styled("c ", theme.accent()),
            Span::styled("Comment ", theme.muted()),
            Span::styled("h ", theme.accent()),
            Span::styled("Heart ", theme.muted()),
            Span::styled("! ", theme.accent()),
            Span::styled("Flag ", theme.muted()),
            Span::styled("d ", theme.accent()),
            Span::styled("Delete ", theme.muted()),
            Span::styled("| ", theme.border()),
            Span::styled("/ ", theme.accent()),
            Span::styled("Filter ", theme.muted()),
            Span::styled("p ", theme.accent()),
            Span::styled("Profile ", theme.muted()),
            Span::styled("r ", theme.accent()),
            Span::styled("Refresh ", theme.muted()),
            Span::styled("| ", theme.border()),
            Span::styled("t ", theme.accent()),
            Span::styled("Theme ", theme.muted()),
            Span::styled("q ", theme.accent()),
            Span::styled("Quit ", theme.muted()),
        ],
    };

    let paragraph = Paragraph::new(Line::from(parts))
        .style(theme.base())
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_posts(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(app, Panel::Posts, format!(" 최근 글 ({}) ", app.posts.len()));

    if app.posts.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "표시할 글이 없습니다. 첫 글을 남겨보세요!",
            theme.muted(),
        ))
        .block(block)
        .wrap(Wrap { trim: false });
        frame.render_widget(empty, area);
        return;
    }

    // two lines per post, keep the selection on screen
    let visible = (area.height.saturating_sub(2) / 2).max(1) as usize;
    let offset = app.selected.saturating_sub(visible - 1);

    let mut lines = Vec::new();
    for (i, post) in app.posts.iter().enumerate().skip(offset).take(visible) {
        let selected = i == app.selected;
        let row_style = if selected {
            theme.selected()
        } else {
            theme.base()
        };

        let mut head = vec![
            Span::styled(format!("#{} ", post.id), theme.muted()),
            Span::styled(format!("[{}] ", post.category.label()), theme.accent()),
            Span::styled(post.author_label(), row_style),
            Span::styled(format!("  ❤️ {}", post.hearts), theme.heart()),
        ];
        if post.is_flagged {
            head.push(Span::styled(" 🚩", theme.warning()));
        }
        if app.post_has_crisis(post) {
            head.push(Span::styled(" ⚠️", theme.error()));
        }
        lines.push(Line::from(head).style(row_style));

        let preview = preview(&post.content);
        lines.push(Line::styled(format!("  {preview}"), row_style));
    }

    let paragraph = Paragraph::new(lines).block(block).style(theme.base());
    frame.render_widget(paragraph, area);
}

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;

    let Some(post) = app.selected_post() else {
        let block = panel_block(app, Panel::Detail, " 글 ".to_string());
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let block = panel_block(app, Panel::Detail, format!(" 글 #{} ", post.id));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("[{}] ", post.category.label()), theme.accent()),
            Span::styled(post.author_label(), theme.base()),
            Span::styled(format!("  {}", post.display_time()), theme.muted()),
        ]),
        Line::from(vec![
            Span::styled(format!("응원 ❤️ {}", post.hearts), theme.heart()),
            Span::styled(
                post.share_code
                    .as_ref()
                    .map(|c| format!("   쉐어코드: {c}"))
                    .unwrap_or_default(),
                theme.muted(),
            ),
            Span::styled(
                if post.is_flagged { "   🚩 신고됨" } else { "" },
                theme.warning(),
            ),
        ]),
        Line::raw(""),
    ];

    lines.extend(
        post.content
            .lines()
            .map(|l| Line::styled(l.to_string(), theme.base())),
    );

    if let Some(notice) = CrisisNotice::for_post(app.post_has_crisis(post)) {
        lines.push(Line::raw(""));
        push_notice(&mut lines, notice, theme);
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("댓글", theme.title()));

    if app.comments.is_empty() {
        lines.push(Line::styled(
            "아직 댓글이 없습니다. 첫 응원을 남겨보세요.",
            theme.muted(),
        ));
    }

    for comment in &app.comments {
        lines.push(Line::from(vec![
            Span::styled("- ", theme.muted()),
            Span::styled(comment.author_label(), theme.accent()),
            Span::styled(format!(" ({}): ", comment.display_time()), theme.muted()),
            Span::styled(comment.content.clone(), theme.base()),
        ]));
        if let Some(notice) = CrisisNotice::for_comment(app.comment_has_crisis(comment)) {
            push_notice(&mut lines, notice, theme);
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(theme.base())
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll as u16, 0));

    frame.render_widget(paragraph, area);
}

fn push_notice(lines: &mut Vec<Line<'static>>, notice: CrisisNotice, theme: &Theme) {
    lines.push(Line::styled(notice.banner, theme.crisis()));
    if let Some(follow_up) = notice.follow_up {
        lines.push(Line::styled(follow_up, theme.warning()));
    }
}

fn render_compose(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let active = app.panel == Panel::Compose;

    let title = match app.compose_target {
        ComposeTarget::Post => format!(
            " ✍️ 글 쓰기 [{}] 쉐어코드 {} ",
            app.compose_category.label(),
            if app.compose_share_code { "ON" } else { "OFF" }
        ),
        ComposeTarget::Comment => match app.selected_id() {
            Some(id) => format!(" 응원/댓글 남기기 → #{id} "),
            None => " 응원/댓글 남기기 ".to_string(),
        },
    };

    let block = panel_block(app, Panel::Compose, title);

    let mut lines = Vec::new();

    if let Some(ack) = &app.ack {
        lines.push(Line::styled(ack.clone(), theme.success()));
        if let Some(notice) = app.ack_notice {
            push_notice(&mut lines, notice, theme);
        }
        lines.push(Line::raw(""));
    }

    let ack_lines = lines.len() as u16;

    if app.compose.text().is_empty() && app.mode != Mode::Insert {
        let hint = match app.compose_target {
            ComposeTarget::Post => "press 'n' to write, 'c' to comment...",
            ComposeTarget::Comment => "따뜻한 말 한마디가 큰 힘이 됩니다.",
        };
        lines.push(Line::styled(hint, theme.muted()));
    } else if app.loading {
        lines.push(Line::styled("saving...", theme.muted()));
    } else {
        lines.push(Line::styled(app.compose.text().to_string(), theme.base()));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(theme.base())
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);

    // place the real terminal cursor while typing
    if app.mode == Mode::Insert && active {
        let inner = area.inner(Margin {
            horizontal: 1,
            vertical: 1,
        });
        let width = inner.width.max(1) as usize;
        let before = Line::from(app.compose.before_cursor()).width();

        let cursor_x = inner.x + (before % width) as u16;
        let cursor_y = inner.y + ack_lines + (before / width) as u16;

        if cursor_x < inner.right() && cursor_y < inner.bottom() {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

fn render_logs(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(app, Panel::Logs, " Logs ".to_string());

    let height = area.height.saturating_sub(2) as usize;
    let end = (app.log_scroll + 1).min(app.logs.len());
    let start = end.saturating_sub(height);

    let lines: Vec<Line> = app.logs[start..end]
        .iter()
        .map(|entry| {
            let (tag, style) = match entry.level {
                LogLevel::Ok => ("[ok]   ", theme.success()),
                LogLevel::Info => ("[info] ", theme.accent()),
                LogLevel::Warn => ("[warn] ", theme.warning()),
                LogLevel::Error => ("[err]  ", theme.error()),
            };
            Line::from(vec![
                Span::styled(tag, style),
                Span::styled(entry.message.clone(), theme.base()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block).style(theme.base());
    frame.render_widget(paragraph, area);
}

fn popup_block(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(title.to_string(), theme.title()))
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .style(theme.base())
}

fn render_theme_popup(frame: &mut Frame, app: &mut App) {
    let theme = &app.theme;
    let area = centered_rect(40, 40, frame.area());
    frame.render_widget(Clear, area);

    let lines: Vec<Line> = ThemeKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let marker = if *kind == app.theme_kind { "● " } else { "  " };
            let style = if i == app.theme_scroll {
                theme.selected()
            } else {
                theme.base()
            };
            Line::styled(format!("{marker}{}", kind.name()), style)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(popup_block(theme, " Themes "));
    frame.render_widget(paragraph, area);
}

fn field_style(theme: &Theme, active: bool) -> ratatui::style::Style {
    if active {
        theme.selected()
    } else {
        theme.base()
    }
}

fn render_identity_popup(frame: &mut Frame, app: &mut App) {
    let theme = &app.theme;
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);

    let roles: Vec<Span> = Role::ALL
        .iter()
        .map(|r| {
            let style = if *r == app.author.role {
                theme.title()
            } else {
                theme.muted()
            };
            Span::styled(format!(" {} ", r.label()), style)
        })
        .collect();

    let mut role_line = vec![Span::styled(
        "역할      ",
        field_style(theme, app.identity_field == 0),
    )];
    role_line.extend(roles);

    let lines = vec![
        Line::styled("당신의 역할을 선택하세요", theme.muted()),
        Line::raw(""),
        Line::from(role_line),
        Line::from(vec![
            Span::styled("닉네임    ", field_style(theme, app.identity_field == 1)),
            Span::styled(app.nickname_input.text().to_string(), theme.base()),
        ]),
        Line::from(vec![
            Span::styled("익명으로  ", field_style(theme, app.identity_field == 2)),
            Span::styled(
                if app.author.is_anonymous { "[x]" } else { "[ ]" },
                theme.accent(),
            ),
        ]),
        Line::raw(""),
        Line::styled(
            "Tab: next field  Space: change  Enter: save  Esc: cancel",
            theme.muted(),
        ),
    ];

    let paragraph = Paragraph::new(lines).block(popup_block(theme, " 역할 설정 "));
    frame.render_widget(paragraph, area);

    if app.identity_field == 1 {
        let x = area.x + 1 + 10 + Line::from(app.nickname_input.before_cursor()).width() as u16;
        let y = area.y + 1 + 3;
        if x < area.right().saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_filter_popup(frame: &mut Frame, app: &mut App) {
    let theme = &app.theme;
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);

    let category = app.filter.category.map(|c| c.label()).unwrap_or(ALL_LABEL);
    let role = app.filter.role.map(|r| r.label()).unwrap_or(ALL_LABEL);

    let lines = vec![
        Line::from(vec![
            Span::styled("카테고리      ", field_style(theme, app.filter_field == 0)),
            Span::styled(format!("< {category} >"), theme.accent()),
        ]),
        Line::from(vec![
            Span::styled("작성자        ", field_style(theme, app.filter_field == 1)),
            Span::styled(format!("< {role} >"), theme.accent()),
        ]),
        Line::from(vec![
            Span::styled("쉐어코드로 찾기 ", field_style(theme, app.filter_field == 2)),
            Span::styled(app.filter_code_input.text().to_string(), theme.base()),
        ]),
        Line::from(vec![
            Span::styled("검색어        ", field_style(theme, app.filter_field == 3)),
            Span::styled(app.filter_text_input.text().to_string(), theme.base()),
        ]),
        Line::raw(""),
        Line::styled(
            "Tab: next  Space: change  Enter: apply  ^r: reset  Esc: close",
            theme.muted(),
        ),
    ];

    let paragraph = Paragraph::new(lines).block(popup_block(theme, " 필터 "));
    frame.render_widget(paragraph, area);
}

fn render_confirm_popup(frame: &mut Frame, app: &mut App) {
    let theme = &app.theme;
    let area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let id = app.selected_id().unwrap_or_default();
    let lines = vec![
        Line::styled(format!("delete post #{id} and its comments?"), theme.base()),
        Line::raw(""),
        Line::from(vec![
            Span::styled("y", theme.error()),
            Span::styled(" delete   ", theme.muted()),
            Span::styled("n", theme.accent()),
            Span::styled(" keep", theme.muted()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(popup_block(theme, " Confirm "))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn preview(content: &str) -> String {
    let first = content.lines().next().unwrap_or_default();
    let mut out: String = first.chars().take(PREVIEW_CHARS).collect();
    if first.chars().count() > PREVIEW_CHARS || content.lines().count() > 1 {
        out.push('…');
    }
    out
}
