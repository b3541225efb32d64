//! 静态课程表：会话开始时即存在、不可变的预编写步骤

use crate::lesson::step::{FlowVariant, LessonStep, Slot};

/// 静态步骤来源；会话创建时调用一次
pub trait StepCatalog: Send + Sync {
    fn static_steps(&self, flow: &FlowVariant) -> Vec<LessonStep>;
}

/// 内置课程表（Hello World / 变量 / 函数）
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinCatalog;

impl StepCatalog for BuiltinCatalog {
    fn static_steps(&self, flow: &FlowVariant) -> Vec<LessonStep> {
        match flow {
            FlowVariant::Scratch { .. } => scratch_steps(),
            FlowVariant::Comparison { .. } => comparison_steps(),
        }
    }
}

fn scratch_steps() -> Vec<LessonStep> {
    vec![
        LessonStep::new("Hello World")
            .with_prose(Slot::Main, r#"Here's a simple "Hello World" program."#)
            .with_code("python", r#"print("Hello World")"#)
            .with_code("javascript", r#"console.log("Hello World");"#),
        LessonStep::new("Variables & Data Types")
            .with_prose(
                Slot::Main,
                "Now that you've run Hello World, let's talk about variables...",
            )
            .with_code("python", "x = 42\nprint(\"The answer is\", x)")
            .with_code("javascript", "let x = 42;\nconsole.log(\"The answer is\", x);"),
        LessonStep::new("Functions")
            .with_prose(
                Slot::Main,
                "Next, let's look at how to create and call functions...",
            )
            .with_code(
                "python",
                "def greet(name):\n    return \"Hello, \" + name\n\nprint(greet(\"World\"))",
            )
            .with_code(
                "javascript",
                "function greet(name) {\n  return \"Hello, \" + name;\n}\nconsole.log(greet(\"World\"));",
            ),
    ]
}

fn comparison_steps() -> Vec<LessonStep> {
    vec![
        LessonStep::new("Hello World (Side by Side)")
            .with_prose(Slot::Left, "JS - Hello World")
            .with_prose(Slot::Right, "Python - Hello World")
            .with_code("javascript", r#"console.log("Hello World");"#)
            .with_code("python", r#"print("Hello World")"#),
        LessonStep::new("Variables (Side by Side)")
            .with_prose(Slot::Left, "JS - Variables")
            .with_prose(Slot::Right, "Python - Variables")
            .with_code("javascript", "let x = 42;\nconsole.log(x);")
            .with_code("python", "x = 42\nprint(x)"),
    ]
}

/// 固定步骤表（测试或外部课程数据使用）
#[derive(Debug, Clone, Default)]
pub struct FixedCatalog {
    steps: Vec<LessonStep>,
}

impl FixedCatalog {
    pub fn new(steps: Vec<LessonStep>) -> Self {
        Self { steps }
    }
}

impl StepCatalog for FixedCatalog {
    fn static_steps(&self, _flow: &FlowVariant) -> Vec<LessonStep> {
        self.steps.clone()
    }
}
