//! TUI 课程主循环
//!
//! 进入全屏/原始模式，每帧按 view_rx 的最新 LessonView 重绘，并把按键转为 Command 发给控制器。
//! 控制器任务结束（第 0 步后退或 Quit）后循环退出，恢复终端并交还 LessonOutcome。

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use crossterm::event::KeyEvent;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::core::{Command, LessonOutcome, LessonView};
use crate::ui::event::{map_key, EventHandler, InputState};
use crate::ui::render::draw;

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    cmd_tx: mpsc::UnboundedSender<Command>,
    view_rx: watch::Receiver<LessonView>,
    handle: JoinHandle<LessonOutcome>,
) -> anyhow::Result<LessonOutcome> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let events = EventHandler::new(cmd_tx.clone());
    let result = event_loop(&mut terminal, || events.poll(), &events, &view_rx, &handle).await;
    restore_terminal(&mut terminal)?;

    if !handle.is_finished() {
        // 渲染或读键失败时也要让控制器收尾（保存进度）
        let _ = cmd_tx.send(Command::Quit);
    }
    let outcome = handle.await?;
    result?;
    Ok(outcome)
}

/// 绘制 + 读键循环；控制器任务结束即返回（next_key 每次最多阻塞一个轮询间隔）
async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    mut next_key: impl FnMut() -> anyhow::Result<Option<KeyEvent>>,
    events: &EventHandler,
    view_rx: &watch::Receiver<LessonView>,
    handle: &JoinHandle<LessonOutcome>,
) -> anyhow::Result<()> {
    let mut input = InputState::default();

    while !handle.is_finished() {
        let view = view_rx.borrow().clone();
        terminal.draw(|f| draw(f, &view, &input))?;

        if let Some(key) = next_key()? {
            if let Some(cmd) = map_key(key, &mut input, &view) {
                if events.dispatch(cmd).is_err() {
                    break;
                }
            }
        }

        tokio::task::yield_now().await;
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
