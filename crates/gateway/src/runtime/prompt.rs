//! Prompt templates per action.
//!
//! `code` and `description` are interpolated verbatim. Nothing here escapes
//! or fences user input, so a crafted description can steer the model.

use sm_domain::action::Action;
use sm_domain::config::PromptLocale;
use sm_domain::message::Message;

/// Focus used by the refactor template when the caller gives none.
const ZH_REFACTOR_FOCUS: &str = "性能/可读性/健壮性";
const EN_REFACTOR_FOCUS: &str = "performance/readability/robustness";

/// Render the instruction text sent to the model.
pub fn build_prompt(
    action: Action,
    code: &str,
    language: &str,
    description: Option<&str>,
    locale: PromptLocale,
) -> String {
    let description = description.unwrap_or("");
    match locale {
        PromptLocale::Zh => zh(action, code, language, description),
        PromptLocale::En => en(action, code, language, description),
    }
}

/// Wrap the rendered prompt as the single user turn of a chat request.
pub fn build_messages(
    action: Action,
    code: &str,
    language: &str,
    description: Option<&str>,
    locale: PromptLocale,
) -> Vec<Message> {
    vec![Message::user(build_prompt(
        action,
        code,
        language,
        description,
        locale,
    ))]
}

fn zh(action: Action, code: &str, language: &str, description: &str) -> String {
    match action {
        Action::Refactor => {
            let focus = if description.is_empty() {
                ZH_REFACTOR_FOCUS
            } else {
                description
            };
            format!(
                "请分析以下{language}代码的可优化点，按优先级排序并给出修改方案：代码：{code}。\
                 优化方向：{focus}。要求：1. 对比修改前后的代码差异 2. 解释每个优化点的收益"
            )
        }
        Action::Debug => format!(
            "诊断并修复以下{language}代码的问题：代码：{code}。错误现象：\"{description}\"。\
             要求：1. 定位根本原因 2. 提供修复后的代码 3. 给出防止复现的建议"
        ),
        Action::Comment => format!(
            "为以下{language}代码添加注释：代码：{code}。\
             要求：1. 函数级文档字符串 2. 关键逻辑行内注释 3. 使用中文术语解释复杂算法"
        ),
        Action::Generate => format!(
            "你是一个资深{language}开发者。请严格按以下要求生成代码：需求描述：\"{code}\"。\
             要求：1. 符合{language}最新语法规范 2. 添加必要异常处理 3. 输出格式：代码块"
        ),
        Action::Default => format!("请用中文处理以下请求，并确保代码保持不变：{code}"),
    }
}

fn en(action: Action, code: &str, language: &str, description: &str) -> String {
    match action {
        Action::Refactor => {
            let focus = if description.is_empty() {
                EN_REFACTOR_FOCUS
            } else {
                description
            };
            format!(
                "Analyze the following {language} code for optimization opportunities, \
                 ordered by priority, and propose changes. Code: {code}. Focus: {focus}. \
                 Requirements: 1. Show a before/after diff of the code \
                 2. Explain the benefit of each optimization"
            )
        }
        Action::Debug => format!(
            "Diagnose and fix the problem in the following {language} code. Code: {code}. \
             Symptom: \"{description}\". Requirements: 1. Identify the root cause \
             2. Provide the fixed code 3. Suggest how to prevent a recurrence"
        ),
        Action::Comment => format!(
            "Add comments to the following {language} code. Code: {code}. \
             Requirements: 1. Function-level doc comments 2. Inline comments on key logic \
             3. Explain complex algorithms in plain English"
        ),
        Action::Generate => format!(
            "You are a senior {language} developer. Generate code that strictly meets this \
             requirement: \"{code}\". Requirements: 1. Follow the latest {language} syntax \
             2. Add necessary error handling 3. Output format: a code block"
        ),
        Action::Default => format!(
            "Process the following request in English and keep the code itself unchanged: {code}"
        ),
    }
}
