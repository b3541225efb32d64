//! 课程流程集成测试：通过公开 API 与控制器通道驱动完整会话

use std::sync::Arc;
use std::time::Duration;

use tutor::config::AppConfig;
use tutor::core::{spawn_lesson, Command, LessonPhase, SessionBuilder};
use tutor::lesson::{
    BuiltinCatalog, ContentFallbackResolver, FixedCatalog, LessonStep, Retreat, StepCatalog,
    StepSource,
};
use tutor::llm::{MockLlmClient, ScriptedLlmClient};
use tutor::{FlowVariant, LessonSession, Slot};

fn offline_builder() -> SessionBuilder {
    SessionBuilder::new(AppConfig::default())
        .with_llm(Arc::new(ScriptedLlmClient::new(Vec::new())))
        .with_progress(false)
}

#[tokio::test]
async fn test_scratch_session_starts_with_static_default() {
    let builder = offline_builder();
    let session = builder.build_session(builder.scratch(Some("python")));
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.code(0, Slot::Main).unwrap(), r#"print("Hello World")"#);
}

#[tokio::test]
async fn test_fetch_failure_appends_numbered_placeholder() {
    let flow = FlowVariant::scratch("python");
    let mut session = LessonSession::new(
        flow.clone(),
        BuiltinCatalog.static_steps(&flow),
        ContentFallbackResolver::new(Arc::new(ScriptedLlmClient::new(vec![Err(
            "503 Service Unavailable".to_string(),
        )]))),
    );

    for expected in 1..=2 {
        assert_eq!(session.advance().await.index, expected);
    }
    let adv = session.advance().await;
    assert!(matches!(adv.source, StepSource::Placeholder { ref reason } if reason.contains("503")));
    assert_eq!(session.len(), 4);
    assert_eq!(session.current_index(), 3);
    assert_eq!(session.current_step().unwrap().title, "Step 4 (AI)");
}

#[tokio::test]
async fn test_generated_steps_follow_the_static_table() {
    let reply = r#"```json
{"title": "Loops", "content": "Repeat things.", "defaultCode": {"python": "for i in range(3):\n    print(i)"}}
```"#;
    let llm = Arc::new(ScriptedLlmClient::new(vec![Ok(reply.to_string())]));
    let builder = SessionBuilder::new(AppConfig::default())
        .with_llm(llm.clone())
        .with_progress(false);
    let mut session = builder.build_session(builder.scratch(Some("python")));

    session.advance().await;
    session.advance().await;
    let adv = session.advance().await;
    assert_eq!(adv.source, StepSource::Generated);
    assert_eq!(session.current_step().unwrap().title, "Loops");
    assert_eq!(
        session.code(3, Slot::Main).unwrap(),
        "for i in range(3):\n    print(i)"
    );

    let prompts = llm.prompts().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Step #3 for python."));
}

#[tokio::test]
async fn test_comparison_right_slot_falls_back_to_javascript() {
    let catalog = FixedCatalog::new(vec![LessonStep::new("Only JS")
        .with_prose(Slot::Left, "JS")
        .with_prose(Slot::Right, "Python")
        .with_code("javascript", "console.log('hi');")]);
    let builder = offline_builder().with_catalog(Arc::new(catalog));
    let session = builder.build_session(builder.comparison(Some("javascript"), Some("python")));
    assert_eq!(session.code(0, Slot::Right).unwrap(), "console.log('hi');");
}

#[tokio::test]
async fn test_retreat_at_start_signals_exit() {
    let builder = offline_builder();
    let mut session = builder.build_session(builder.scratch(None));
    assert_eq!(session.retreat(), Retreat::Exit);
    assert_eq!(session.current_index(), 0);
}

#[tokio::test]
async fn test_controller_round_trip_keeps_edits() {
    let builder = SessionBuilder::new(AppConfig::default())
        .with_llm(Arc::new(MockLlmClient))
        .with_progress(false);
    let (tx, mut view, handle) = spawn_lesson(
        builder.build_session(builder.comparison(None, None)),
        None,
    );

    tx.send(Command::Edit {
        slot: Slot::Right,
        text: "print(1)".to_string(),
    })
    .unwrap();
    tx.send(Command::Next).unwrap();
    tx.send(Command::Next).unwrap(); // 生成第 3 步
    tx.send(Command::Previous).unwrap();
    tx.send(Command::Previous).unwrap();

    // 等待控制器处理完毕并回到第 0 步
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            view.changed().await.unwrap();
            let v = view.borrow_and_update().clone();
            if v.index == 0 && v.total == 3 && v.phase == LessonPhase::Ready {
                break;
            }
        }
    })
    .await
    .unwrap();

    let right = view.borrow().slot(Slot::Right).cloned().unwrap();
    assert_eq!(right.code, "print(1)");

    tx.send(Command::Previous).unwrap();
    let outcome = handle.await.unwrap();
    assert!(outcome.exited_at_start);
    assert_eq!(outcome.session.len(), 3);
    assert_eq!(outcome.session.steps().get(2).unwrap().title, "Practice 3");
}
