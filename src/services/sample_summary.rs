//! 示例摘要生成 - 业务能力层
//!
//! AI 服务容量受限时生成明确标注为示例的摘要，保证界面不会停在死胡同

use crate::models::{Language, SummaryRecord};

/// 每个示例字段都带有这个标记
pub const SAMPLE_MARKER: &str = "[Sample data - AI service limit reached]";

/// 生成示例摘要
///
/// 只用于显示：不持久化，也不计入试用次数。
pub fn sample_summary() -> SummaryRecord {
    let mark = |text: &str| format!("{} {}", SAMPLE_MARKER, text);

    SummaryRecord {
        document_overview: mark(
            "We're currently experiencing high demand on our AI service. This is a sample summary to demonstrate how the results would appear.",
        ),
        key_parties: vec![
            mark("Party A (sample)"),
            mark("Party B (sample)"),
        ],
        important_clauses: vec![
            mark("Free tier usage is currently at capacity"),
            mark("For full functionality, please register for full access"),
            mark("Registration provides higher usage limits and priority processing"),
        ],
        critical_dates: vec![mark("No dates extracted (sample)")],
        potential_concerns: vec![mark("This content was not generated from your document")],
        plain_language_summary: mark(
            "To get actual summaries of your documents and avoid usage limits, please register for full access with higher processing limits and priority service.",
        ),
        language: Language::English,
    }
}

/// 是否为示例摘要（所有字段都带标记）
pub fn is_sample(record: &SummaryRecord) -> bool {
    record
        .fields()
        .iter()
        .all(|(_, text)| text.contains(SAMPLE_MARKER))
}
