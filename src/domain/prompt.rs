//! 生成提示词组装
//!
//! 章节正文提示词: 小说类型 + 主题 + 完整大纲原文 + 本章标题/梗概，
//! 以及（存在上一章正文时）限长的结尾回顾作为连续性上下文。
//! 大纲生成提示词: 系统指令 + 类型/主题约束。

/// 连续性上下文的最大字符数（取上一章正文最末尾的部分）
pub const PREV_CONTEXT_MAX_CHARS: usize = 2000;

/// 章节正文生成的提示词上下文
#[derive(Debug, Clone)]
pub struct ChapterPrompt {
    pub novel_type: String,
    pub theme: String,
    /// 完整大纲原文，逐字复用
    pub outline: String,
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    /// 上一章正文（存在时截取结尾）
    pub previous_content: Option<String>,
}

impl ChapterPrompt {
    /// 渲染为完整的用户提示词
    pub fn render(&self) -> String {
        let context_base = format!(
            "小说类型：{}\n主题：{}\n完整大纲参考：\n{}",
            self.novel_type, self.theme, self.outline
        );

        let prev_section = match self.previous_content.as_deref() {
            Some(prev) => {
                let tail = tail_chars(prev, PREV_CONTEXT_MAX_CHARS);
                format!(
                    "【上一章（第{}章）结尾内容回顾】\n{}\n--------------------------------\n\
                     指令：请务必紧接上一章的结尾剧情继续创作，保持场景、时间、人物状态的连贯性。\n\n",
                    self.chapter_number.saturating_sub(1),
                    tail
                )
            }
            None => String::new(),
        };

        format!(
            "你是一位专业畅销小说作家。\n\
             任务：请根据提供的大纲和上下文，创作小说第{num}章的正文。\n\
             章节标题：{title}\n\
             本章梗概：{summary}\n\n\
             {prev}【小说完整大纲与设定】\n\
             {base}\n\n\
             要求：\n\
             1. 字数要求：2000字以上。\n\
             2. 剧情紧凑，场景描写生动，人物对话符合性格。\n\
             3. 严格贴合本章梗概，承接上文（如果有），铺垫下文。\n\
             4. 输出纯正文内容，不要包含\"第X章\"标题，直接开始正文描写。",
            num = self.chapter_number,
            title = self.title,
            summary = self.summary,
            prev = prev_section,
            base = context_base,
        )
    }
}

/// 取字符串最末尾的 max_chars 个字符
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    match text.char_indices().nth(skip) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => text,
    }
}

/// 大纲生成的系统指令
pub fn outline_system_instruction() -> &'static str {
    "你是资深网络小说策划编辑，擅长打造强爽点节奏的长篇网文。\n\
     你的任务是按要求输出完整的中文小说大纲，语言简洁有力。\n\
     输出要求：\n\
     1) 作品名\n\
     2) 类型\n\
     3) 核心人设（主角、对手、导师、盟友）\n\
     4) 世界观与设定（时代、地域、权力结构、资源）\n\
     5) 爽点清单（10条以上，明确冲突与反转）\n\
     6) 三幕结构梗概（每幕5-8个关键节点）\n\
     7) 章节大纲（至少24章，每章包含标题与1-2句梗概，推进冲突与爽点）\n\
     8) 可扩展支线与后续走向\n\
     风格：节奏快、冲突密集、反转频繁、爽点直给。\n\
     重要提示：章节标题中请勿包含\"第X章\"前缀，仅输出纯标题。"
}

/// 大纲生成的用户提示词（类型/主题约束）
pub fn outline_user_prompt(novel_type: &str, theme: &str) -> String {
    format!(
        "类型：{}\n\
         主题/设定：{}\n\
         必须严格对齐类型与主题，使用中文，本土现实语境。\n\
         不得引入仙侠、修真、灵气、法术、赛博、星际、外星、末日等元素。\n\
         世界观与角色设定需贴近现实逻辑，避免科幻或玄幻成分。\n\n\
         请根据以上要求生成完整的小说大纲。",
        novel_type, theme
    )
}

/// 清理生成文本，移除模型的寒暄/过渡行
pub fn sanitize_generated(text: &str) -> String {
    const BAD_PREFIXES: &[&str] = &[
        "收到",
        "感谢",
        "作为资深",
        "我将",
        "我会",
        "策划案",
        "以下是",
        "将为您",
        "为了确保",
        "基于您",
        "这里为您提供",
    ];

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !BAD_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect::<Vec<_>>()
        .join("\n")
}
