//! 本地词典翻译 - 业务能力层
//!
//! 远程翻译全部不可用时的兜底：整词替换，不保证语法，也不保证完整

use std::sync::OnceLock;

use phf::phf_map;
use regex::{Captures, Regex};

use crate::error::{AppError, AppResult};
use crate::models::{FieldId, SummaryRecord};

/// 英文 → 印地语词表（键全部小写）
static DICTIONARY: phf::Map<&'static str, &'static str> = phf_map! {
    "key points" => "मुख्य बिंदु",
    "plain language" => "सरल भाषा",
    "terms and conditions" => "नियम और शर्तें",
    "effective date" => "प्रभावी तिथि",
    "document" => "दस्तावेज़",
    "documents" => "दस्तावेज़",
    "summary" => "सारांश",
    "overview" => "अवलोकन",
    "agreement" => "समझौता",
    "contract" => "अनुबंध",
    "legal" => "कानूनी",
    "law" => "कानून",
    "court" => "न्यायालय",
    "important" => "महत्वपूर्ण",
    "critical" => "महत्वपूर्ण",
    "potential" => "संभावित",
    "concern" => "चिंता",
    "concerns" => "चिंताएं",
    "date" => "तारीख",
    "dates" => "तारीखें",
    "day" => "दिन",
    "days" => "दिन",
    "month" => "महीना",
    "months" => "महीने",
    "year" => "वर्ष",
    "years" => "वर्ष",
    "party" => "पक्ष",
    "parties" => "पक्षों",
    "clause" => "खंड",
    "clauses" => "खंड",
    "section" => "धारा",
    "article" => "अनुच्छेद",
    "rights" => "अधिकार",
    "obligations" => "दायित्व",
    "liability" => "देयता",
    "tenant" => "किरायेदार",
    "landlord" => "मकान मालिक",
    "lease" => "पट्टा",
    "rent" => "किराया",
    "deposit" => "जमा राशि",
    "payment" => "भुगतान",
    "amount" => "राशि",
    "fee" => "शुल्क",
    "penalty" => "जुर्माना",
    "breach" => "उल्लंघन",
    "termination" => "समाप्ति",
    "renewal" => "नवीनीकरण",
    "notice" => "सूचना",
    "property" => "संपत्ति",
    "employer" => "नियोक्ता",
    "employee" => "कर्मचारी",
    "confidentiality" => "गोपनीयता",
    "dispute" => "विवाद",
    "arbitration" => "मध्यस्थता",
    "signature" => "हस्ताक्षर",
    "sample" => "नमूना",
    "before" => "से पहले",
    "after" => "के बाद",
    "must" => "अवश्य",
    "not" => "नहीं",
    "no" => "नहीं",
    "is" => "है",
    "are" => "हैं",
    "for" => "के लिए",
    "with" => "के साथ",
    "and" => "और",
    "or" => "या",
    "the" => "यह",
};

static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// 所有词条组成一个正则，长词条在前，保证 "key points" 优先于 "points"
fn pattern() -> AppResult<&'static Regex> {
    PATTERN
        .get_or_init(|| {
            let mut keys: Vec<&str> = DICTIONARY.keys().copied().collect();
            keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
        })
        .as_ref()
        .map_err(|e| AppError::Config(format!("词典正则无效: {}", e)))
}

/// 整词替换（忽略大小写），词表外的词保持原样
pub fn translate_text(text: &str) -> AppResult<String> {
    let re = pattern()?;
    let translated = re.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        DICTIONARY
            .get(matched.to_lowercase().as_str())
            .copied()
            .unwrap_or(matched)
            .to_string()
    });
    Ok(translated.into_owned())
}

/// 是否残留未翻译的英文：连续 3 个及以上拉丁字母
pub fn contains_residual_latin(text: &str) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// 列出残留英文的字段
pub fn residual_latin_fields(record: &SummaryRecord) -> Vec<FieldId> {
    record
        .fields()
        .into_iter()
        .filter(|(_, text)| contains_residual_latin(text))
        .map(|(id, _)| id)
        .collect()
}
