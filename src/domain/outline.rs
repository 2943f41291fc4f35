//! 大纲解析器 - 从自由文本中提取章节结构
//!
//! 支持两种标题方言:
//! - 主方言（中文）: 「第N章 标题：梗概」，分隔符可以是半角/全角冒号或换行
//! - 回退方言（英文）: 「Chapter N Title: summary」（Ch / Ch. 亦可，大小写不敏感），
//!   冒号必需
//!
//! 两种方言在一次解析中不混用: 仅当主方言一个记录都没有匹配到时，
//! 才用回退方言重新扫描整个原文。
//!
//! 实现为显式的两遍扫描（寻找标题头 -> 读正文直到下一个标题头），
//! 不使用正则引擎，对恶意输入没有回溯风险。

use serde::{Deserialize, Serialize};

/// 解析出的章节记录
///
/// 不变量:
/// - number 为正整数
/// - 输出按 number 稳定升序排序；重复编号按扫描顺序全部保留
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChapter {
    /// 章节编号
    pub number: u32,
    /// 章节标题（允许为空字符串）
    pub title: String,
    /// 章节梗概（允许为空字符串）
    pub summary: String,
}

/// 解析大纲文本，提取章节列表
///
/// 永不失败；无法识别任何章节结构时返回空列表，由调用方判定大纲不可用。
pub fn parse_outline(text: &str) -> Vec<ParsedChapter> {
    let chars: Vec<char> = text.chars().collect();

    let mut records = scan(&chars, Dialect::Cn);
    if records.is_empty() {
        records = scan(&chars, Dialect::En);
    }

    // 稳定排序: 重复编号保持扫描顺序
    records.sort_by_key(|r| r.number);
    records
}

/// 标题方言
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// 「第N章」
    Cn,
    /// 「Chapter N」/「Ch N」/「Ch. N」
    En,
}

/// 匹配到的标题头记号
struct HeadingToken {
    /// 章节编号
    number: u32,
    /// 记号起始位置（字符下标）
    start: usize,
    /// 记号结束后的位置
    after: usize,
}

/// 单方言扫描: 寻找标题头 -> 读行内标题 -> 读正文直到下一个行首标题头
fn scan(chars: &[char], dialect: Dialect) -> Vec<ParsedChapter> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let Some(heading) = find_heading(chars, pos, dialect) else {
            break;
        };

        match read_inline_title(chars, heading.after, dialect) {
            Some((title, body_start)) => {
                let body_end = find_body_end(chars, body_start, dialect);
                let summary = collect_trimmed(chars, body_start, body_end);
                out.push(ParsedChapter {
                    number: heading.number,
                    title,
                    summary,
                });
                pos = body_end;
            }
            // 缺少分隔符, 不构成完整标题, 从下一个字符继续找
            None => pos = heading.start + 1,
        }
    }

    out
}

/// 从 from 起寻找下一个标题头记号（起始位置不要求行首）
fn find_heading(chars: &[char], from: usize, dialect: Dialect) -> Option<HeadingToken> {
    let mut i = from;
    while i < chars.len() {
        if let Some((number, after)) = match_heading_token(chars, i, dialect) {
            return Some(HeadingToken {
                number,
                start: i,
                after,
            });
        }
        i += 1;
    }
    None
}

/// 在位置 i 尝试匹配标题头记号，返回章节编号与记号结束位置
fn match_heading_token(chars: &[char], i: usize, dialect: Dialect) -> Option<(u32, usize)> {
    match dialect {
        Dialect::Cn => match_cn_token(chars, i),
        Dialect::En => match_en_token(chars, i),
    }
}

/// 「第」ws* 数字+ ws* 「章」
fn match_cn_token(chars: &[char], i: usize) -> Option<(u32, usize)> {
    if chars.get(i) != Some(&'第') {
        return None;
    }
    let mut j = skip_inline_ws(chars, i + 1);
    let (number, next) = read_number(chars, j)?;
    j = skip_inline_ws(chars, next);
    if chars.get(j) != Some(&'章') {
        return None;
    }
    Some((number, j + 1))
}

/// 「Chapter」/「Ch」可带「.」, ws* 数字+ （大小写不敏感）
fn match_en_token(chars: &[char], i: usize) -> Option<(u32, usize)> {
    let mut j = if matches_ignore_case(chars, i, "chapter") {
        i + 7
    } else if matches_ignore_case(chars, i, "ch") {
        i + 2
    } else {
        return None;
    };
    if chars.get(j) == Some(&'.') {
        j += 1;
    }
    j = skip_inline_ws(chars, j);
    let (number, next) = read_number(chars, j)?;
    Some((number, next))
}

/// 读取行内标题，返回 (标题, 正文起始位置)
///
/// 中文方言分隔符为 `:` / `：` / 换行；英文方言冒号必需且标题不可跨行。
/// 到达文本末尾仍未遇到分隔符则匹配失败。
fn read_inline_title(chars: &[char], from: usize, dialect: Dialect) -> Option<(String, usize)> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            ':' | '：' => {
                let title = collect_trimmed(chars, from, i);
                return Some((title, i + 1));
            }
            '\n' => {
                if dialect == Dialect::Cn {
                    let title = collect_trimmed(chars, from, i);
                    return Some((title, i + 1));
                }
                return None;
            }
            _ => i += 1,
        }
    }
    None
}

/// 正文从 from 一直延伸到下一个行首标题头之前的换行符，或文本末尾
///
/// 回退方言的正文同样被下一个中文标题头终止，与原始行为一致。
fn find_body_end(chars: &[char], from: usize, dialect: Dialect) -> usize {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\n' {
            let j = skip_ws(chars, i + 1);
            let terminated = match dialect {
                Dialect::Cn => match_cn_token(chars, j).is_some(),
                Dialect::En => {
                    match_en_token(chars, j).is_some() || match_cn_token(chars, j).is_some()
                }
            };
            if terminated {
                return i;
            }
        }
        i += 1;
    }
    chars.len()
}

/// 读取连续数字，返回 (数值, 结束位置)；至少一位
fn read_number(chars: &[char], from: usize) -> Option<(u32, usize)> {
    let mut i = from;
    let mut value: u32 = 0;
    while let Some(d) = chars.get(i).and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d);
        i += 1;
    }
    if i == from {
        return None;
    }
    Some((value, i))
}

/// 跳过行内空白（不含换行）
fn skip_inline_ws(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while chars.get(i).is_some_and(|c| c.is_whitespace() && *c != '\n') {
        i += 1;
    }
    i
}

/// 跳过所有空白（含换行）
fn skip_ws(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
        i += 1;
    }
    i
}

fn matches_ignore_case(chars: &[char], from: usize, word: &str) -> bool {
    let mut i = from;
    for expected in word.chars() {
        let Some(c) = chars.get(i) else {
            return false;
        };
        if !c.eq_ignore_ascii_case(&expected) {
            return false;
        }
        i += 1;
    }
    true
}

fn collect_trimmed(chars: &[char], from: usize, to: usize) -> String {
    chars[from..to].iter().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cn_outline() {
        let text = "第1章 风起：主角登场。\n第2章 反击：主角出手。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, 1);
        assert_eq!(records[0].title, "风起");
        assert_eq!(records[0].summary, "主角登场。");
        assert_eq!(records[1].number, 2);
        assert_eq!(records[1].title, "反击");
        assert_eq!(records[1].summary, "主角出手。");
    }

    #[test]
    fn test_parse_cn_newline_separator() {
        let text = "第1章 开端\n主角进城，遇到旧识。\n第2章 交锋\n双方摊牌。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "开端");
        assert_eq!(records[0].summary, "主角进城，遇到旧识。");
        assert_eq!(records[1].title, "交锋");
        assert_eq!(records[1].summary, "双方摊牌。");
    }

    #[test]
    fn test_parse_cn_fullwidth_colon_and_spaces() {
        let text = "第 3 章 决战：最终对决。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, 3);
        assert_eq!(records[0].title, "决战");
        assert_eq!(records[0].summary, "最终对决。");
    }

    #[test]
    fn test_parse_multiline_summary() {
        let text = "第1章 序幕：夜雨。\n旧城区的一桩旧案。\n第2章 线索：档案室。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary, "夜雨。\n旧城区的一桩旧案。");
        assert_eq!(records[1].summary, "档案室。");
    }

    #[test]
    fn test_records_sorted_by_number() {
        let text = "第3章 尾声：收网。\n第1章 开局：布线。\n第2章 中盘：收线。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(records[0].title, "开局");
    }

    #[test]
    fn test_duplicate_numbers_preserved_in_scan_order() {
        let text = "第2章 甲：一。\n第2章 乙：二。\n第1章 丙：三。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].number, 1);
        assert_eq!(records[1].number, 2);
        assert_eq!(records[1].title, "甲");
        assert_eq!(records[2].number, 2);
        assert_eq!(records[2].title, "乙");
    }

    #[test]
    fn test_en_fallback_dialect() {
        let text = "Chapter 1 The Spark: The hero arrives.\nChapter 2 Pushback: The hero strikes.";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, 1);
        assert_eq!(records[0].title, "The Spark");
        assert_eq!(records[0].summary, "The hero arrives.");
        assert_eq!(records[1].title, "Pushback");
    }

    #[test]
    fn test_en_short_forms_case_insensitive() {
        let text = "ch. 1 Intro: opening.\nCH 2 Rising: conflict.";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Intro");
        assert_eq!(records[1].number, 2);
        assert_eq!(records[1].summary, "conflict.");
    }

    #[test]
    fn test_en_requires_colon() {
        // 英文方言没有冒号分隔符时不构成标题
        let text = "Chapter 1 Intro\nsome text";
        assert!(parse_outline(text).is_empty());
    }

    #[test]
    fn test_dialects_never_mixed() {
        // 中文方言命中后，英文形式的标题只是正文的一部分
        let text = "第1章 开端：序章内容。\nChapter 2 Hidden: should stay in body.";
        let records = parse_outline(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, 1);
        assert!(records[0].summary.contains("Chapter 2"));
    }

    #[test]
    fn test_heading_without_body_yields_empty_summary() {
        let text = "第1章 空章：\n第2章 正常：有内容。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary, "");
        assert_eq!(records[1].summary, "有内容。");
    }

    #[test]
    fn test_trailing_heading_without_body() {
        let text = "第1章 终局：";
        let records = parse_outline(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "终局");
        assert_eq!(records[0].summary, "");
    }

    #[test]
    fn test_non_numeric_heading_skipped() {
        let text = "第章 无编号：跳过。\n第5章 有编号：保留。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, 5);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_outline("").is_empty());
    }

    #[test]
    fn test_unstructured_text() {
        let text = "这是一段没有任何章节标记的叙述文字。\n它描述了一个故事的走向。";
        assert!(parse_outline(text).is_empty());
    }

    #[test]
    fn test_en_body_terminated_by_cn_heading() {
        // 回退扫描中的正文同样被中文标题头终止（继承原始行为）
        let text = "Chapter 1 Start: body one.\n第9章 插入：不会被解析为英文正文。";
        let records = parse_outline(text);

        // 主方言先命中「第9章」，所以实际走的是中文扫描
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, 9);
    }

    #[test]
    fn test_first_heading_mid_line() {
        let text = "前言若干 第1章 正篇：正文在此。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "正篇");
        assert_eq!(records[0].summary, "正文在此。");
    }

    #[test]
    fn test_mid_line_heading_not_a_body_terminator() {
        // 行中出现的标题头不终止正文，只有行首的才算
        let text = "第1章 开端：他想起第2章 的标题。\n第2章 后续：继续。";
        let records = parse_outline(text);

        assert_eq!(records.len(), 2);
        assert!(records[0].summary.contains("第2章"));
        assert_eq!(records[1].title, "后续");
    }
}
