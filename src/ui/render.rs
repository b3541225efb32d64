//! 渲染：把 LessonView 画到终端
//!
//! 顶部标题栏显示流程与「Step i of n」；中间每个槽位一列（Comparison 左右并排），上半为说明、下半为代码；
//! 底部为按键提示。生成中时正文替换为加载提示。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::{LessonPhase, LessonView, SlotView};
use crate::ui::event::InputState;

const NAV_HINT: &str = " n 下一步 │ p 上一步 │ e 编辑代码 │ q 退出 ";
const EDIT_HINT: &str = " 输入即保存 │ Enter 换行 │ Tab 切换槽位 │ Esc 结束编辑 ";

pub fn draw(f: &mut Frame, view: &LessonView, input: &InputState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    let mut title = format!(" Tutor │ {} │ {} ", view.flow, view.progress_label());
    if view.degraded {
        title.push_str("│ offline ");
    }
    let header_text = match view.phase {
        LessonPhase::Loading => "Loading next step...".to_string(),
        LessonPhase::Exited => "Lesson closed.".to_string(),
        LessonPhase::Ready => view.title.clone(),
    };
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if view.degraded {
                Color::Red
            } else {
                Color::Yellow
            })),
    );
    f.render_widget(header, chunks[0]);

    if view.phase == LessonPhase::Ready && !view.slots.is_empty() {
        let n = view.slots.len() as u32;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(view.slots.iter().map(|_| Constraint::Ratio(1, n)))
            .split(chunks[1]);
        for (slot, area) in view.slots.iter().zip(columns.iter()) {
            draw_slot(f, *area, slot, input);
        }
    }

    let hint = if input.editing.is_some() { EDIT_HINT } else { NAV_HINT };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        chunks[2],
    );
}

fn draw_slot(f: &mut Frame, area: Rect, slot: &SlotView, input: &InputState) {
    let editing = input.editing == Some(slot.slot);
    let block = Block::default()
        .title(format!(" [{}] {} ", slot.slot, slot.language.to_uppercase()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Green } else { Color::Blue }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    f.render_widget(
        Paragraph::new(slot.prose.as_str()).wrap(Wrap { trim: true }),
        parts[0],
    );

    let code = if editing {
        format!("{}▏", input.buffer)
    } else {
        slot.code.clone()
    };
    // 代码保留缩进
    f.render_widget(
        Paragraph::new(code)
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::TOP))
            .wrap(Wrap { trim: false }),
        parts[1],
    );
}
