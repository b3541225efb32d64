//! 课程控制器：每个课程视图一个后台任务，独占 LessonSession
//!
//! UI 通过 mpsc 发送 Command，通过 watch 读取 LessonView。命令串行处理：
//! 生成下一步期间（Loading）收到的 Next / Previous 被丢弃，Edit 暂存到生成结束后写入离开的那一步，
//! Quit 在生成结束后生效。因此同一会话最多只有一个进行中的生成请求。

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::{LessonPhase, LessonView};
use crate::lesson::{LessonSession, Retreat, Slot, StepSource};
use crate::progress::ProgressTracker;

/// 从 UI 发往控制器的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 下一步（必要时生成）
    Next,
    /// 上一步；在第 0 步时退出会话
    Previous,
    /// 编辑器 onChange：覆盖当前步骤某槽位的代码
    Edit { slot: Slot, text: String },
    /// 离开课程页面
    Quit,
}

/// 控制器任务结束时交还的状态
pub struct LessonOutcome {
    pub session: LessonSession,
    pub progress: Option<ProgressTracker>,
    /// 是否因在第 0 步后退而退出（否则为 Quit 或命令通道关闭）
    pub exited_at_start: bool,
}

/// 启动控制器：返回命令发送端、视图接收端、任务句柄
pub fn spawn_lesson(
    session: LessonSession,
    progress: Option<ProgressTracker>,
) -> (
    mpsc::UnboundedSender<Command>,
    watch::Receiver<LessonView>,
    JoinHandle<LessonOutcome>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (view_tx, view_rx) = watch::channel(LessonView::project(&session, LessonPhase::Ready));

    let span = tracing::info_span!(
        "lesson",
        session_id = %Uuid::new_v4(),
        flow = %session.flow(),
    );
    let handle = tokio::spawn(run(session, progress, cmd_rx, view_tx).instrument(span));

    (cmd_tx, view_rx, handle)
}

fn publish(view_tx: &watch::Sender<LessonView>, session: &LessonSession, phase: LessonPhase) {
    let _ = view_tx.send(LessonView::project(session, phase));
}

async fn run(
    mut session: LessonSession,
    mut progress: Option<ProgressTracker>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    view_tx: watch::Sender<LessonView>,
) -> LessonOutcome {
    tracing::info!(steps = session.len(), "Lesson session started");
    let mut exited_at_start = false;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            Command::Next => {
                let leaving = session.current_index();
                if leaving + 1 >= session.len() {
                    publish(&view_tx, &session, LessonPhase::Loading);
                }

                let mut deferred: Vec<(Slot, String)> = Vec::new();
                let mut quit = false;
                let advanced = {
                    let advance = session.advance();
                    tokio::pin!(advance);
                    loop {
                        tokio::select! {
                            biased;
                            advanced = &mut advance => break advanced,
                            Some(cmd) = cmd_rx.recv() => match cmd {
                                ignored @ (Command::Next | Command::Previous) => {
                                    tracing::debug!(?ignored, "Navigation ignored while loading next step");
                                }
                                Command::Edit { slot, text } => deferred.push((slot, text)),
                                Command::Quit => quit = true,
                            },
                        }
                    }
                };

                for (slot, text) in deferred {
                    if let Err(e) = session.set_code(leaving, slot, text) {
                        tracing::warn!(error = %e, "Deferred edit rejected");
                    }
                }
                if let StepSource::Placeholder { reason } = &advanced.source {
                    tracing::info!(index = advanced.index, %reason, "Showing placeholder step");
                }
                if let Some(tracker) = progress.as_mut() {
                    tracker.record_step(session.flow(), leaving);
                }

                if quit {
                    publish(&view_tx, &session, LessonPhase::Exited);
                    break;
                }
                publish(&view_tx, &session, LessonPhase::Ready);
            }
            Command::Previous => match session.retreat() {
                Retreat::Moved(_) => publish(&view_tx, &session, LessonPhase::Ready),
                Retreat::Exit => {
                    exited_at_start = true;
                    publish(&view_tx, &session, LessonPhase::Exited);
                    break;
                }
            },
            Command::Edit { slot, text } => match session.edit_current(slot, text) {
                Ok(()) => publish(&view_tx, &session, LessonPhase::Ready),
                Err(e) => tracing::warn!(error = %e, "Edit rejected"),
            },
            Command::Quit => {
                publish(&view_tx, &session, LessonPhase::Exited);
                break;
            }
        }
    }

    tracing::info!(
        index = session.current_index(),
        steps = session.len(),
        "Lesson session ended"
    );
    LessonOutcome {
        session,
        progress,
        exited_at_start,
    }
}
