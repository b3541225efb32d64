//! 事件处理
//!
//! 轮询 crossterm 键盘事件。浏览模式下 n/p/q 直接映射为 Next/Previous/Quit，`e` 进入编辑模式；
//! 编辑模式下每次按键都把整段缓冲作为 `Command::Edit` 发出（对应编辑器 onChange），Tab 切换槽位，Esc 返回浏览。

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::{Command, LessonError, LessonPhase, LessonView};
use crate::lesson::Slot;

/// 单次轮询等待上限；主循环借此定期检查控制器是否已结束
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 输入状态：`editing` 为正在编辑的槽位，`buffer` 为该槽位的完整代码
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub editing: Option<Slot>,
    pub buffer: String,
}

impl InputState {
    fn begin_edit(&mut self, slot: Slot, view: &LessonView) {
        self.editing = Some(slot);
        self.buffer = view.slot(slot).map(|s| s.code.clone()).unwrap_or_default();
    }

    fn end_edit(&mut self) {
        self.editing = None;
        self.buffer.clear();
    }

    fn edit_command(&self, slot: Slot) -> Command {
        Command::Edit {
            slot,
            text: self.buffer.clone(),
        }
    }
}

/// 把一次按键映射为控制器 Command；只改变输入状态的按键返回 None
pub fn map_key(key: KeyEvent, input: &mut InputState, view: &LessonView) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let Some(slot) = input.editing else {
        return match key.code {
            KeyCode::Char('n') | KeyCode::Right => Some(Command::Next),
            KeyCode::Char('p') | KeyCode::Left => Some(Command::Previous),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('e') => {
                if view.phase == LessonPhase::Ready {
                    if let Some(first) = view.slots.first() {
                        input.begin_edit(first.slot, view);
                    }
                }
                None
            }
            _ => None,
        };
    };

    match key.code {
        KeyCode::Esc => {
            input.end_edit();
            None
        }
        KeyCode::Tab => {
            let slots: Vec<Slot> = view.slots.iter().map(|s| s.slot).collect();
            if let Some(pos) = slots.iter().position(|s| *s == slot) {
                input.begin_edit(slots[(pos + 1) % slots.len()], view);
            }
            None
        }
        KeyCode::Enter => {
            input.buffer.push('\n');
            Some(input.edit_command(slot))
        }
        KeyCode::Backspace => {
            input.buffer.pop()?;
            Some(input.edit_command(slot))
        }
        KeyCode::Char(c) => {
            input.buffer.push(c);
            Some(input.edit_command(slot))
        }
        _ => None,
    }
}

/// 事件处理器：持有 cmd_tx，poll 读键盘，dispatch 发送 Command
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    /// 最多等待 POLL_INTERVAL，返回一次按下事件
    pub fn poll(&self) -> anyhow::Result<Option<KeyEvent>> {
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }

    pub fn dispatch(&self, cmd: Command) -> Result<(), LessonError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| LessonError::ControllerClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SlotView;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn comparison_view() -> LessonView {
        LessonView {
            phase: LessonPhase::Ready,
            flow: "comparison(javascript, python)".to_string(),
            index: 0,
            total: 3,
            title: "Variables".to_string(),
            slots: vec![
                SlotView {
                    slot: Slot::Left,
                    language: "javascript".to_string(),
                    prose: "let".to_string(),
                    code: "let x = 1;".to_string(),
                },
                SlotView {
                    slot: Slot::Right,
                    language: "python".to_string(),
                    prose: "assign".to_string(),
                    code: "x = 1".to_string(),
                },
            ],
            degraded: false,
            input_locked: false,
        }
    }

    #[test]
    fn test_navigation_keys() {
        let view = comparison_view();
        let mut input = InputState::default();
        assert_eq!(map_key(key(KeyCode::Char('n')), &mut input, &view), Some(Command::Next));
        assert_eq!(map_key(key(KeyCode::Char('p')), &mut input, &view), Some(Command::Previous));
        assert_eq!(map_key(key(KeyCode::Char('q')), &mut input, &view), Some(Command::Quit));
        assert_eq!(map_key(key(KeyCode::Esc), &mut input, &view), Some(Command::Quit));
        assert_eq!(map_key(key(KeyCode::Char('x')), &mut input, &view), None);
        assert_eq!(
            map_key(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                &mut input,
                &view
            ),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_edit_mode_sends_full_buffer() {
        let view = comparison_view();
        let mut input = InputState::default();

        assert_eq!(map_key(key(KeyCode::Char('e')), &mut input, &view), None);
        assert_eq!(input.editing, Some(Slot::Left));
        assert_eq!(input.buffer, "let x = 1;");

        // 编辑模式下 n 是普通字符
        assert_eq!(
            map_key(key(KeyCode::Char('n')), &mut input, &view),
            Some(Command::Edit {
                slot: Slot::Left,
                text: "let x = 1;n".to_string(),
            })
        );
        assert_eq!(
            map_key(key(KeyCode::Backspace), &mut input, &view),
            Some(Command::Edit {
                slot: Slot::Left,
                text: "let x = 1;".to_string(),
            })
        );

        assert_eq!(map_key(key(KeyCode::Tab), &mut input, &view), None);
        assert_eq!(input.editing, Some(Slot::Right));
        assert_eq!(
            map_key(key(KeyCode::Enter), &mut input, &view),
            Some(Command::Edit {
                slot: Slot::Right,
                text: "x = 1\n".to_string(),
            })
        );

        assert_eq!(map_key(key(KeyCode::Esc), &mut input, &view), None);
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn test_edit_blocked_while_loading() {
        let mut view = comparison_view();
        view.phase = LessonPhase::Loading;
        let mut input = InputState::default();
        assert_eq!(map_key(key(KeyCode::Char('e')), &mut input, &view), None);
        assert_eq!(input.editing, None);
    }

    #[test]
    fn test_dispatch_after_controller_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler = EventHandler::new(tx);
        assert!(handler.dispatch(Command::Next).is_ok());
        drop(rx);
        assert!(matches!(
            handler.dispatch(Command::Quit),
            Err(LessonError::ControllerClosed)
        ));
    }
}
