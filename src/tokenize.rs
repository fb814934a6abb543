use jieba_rs::Jieba;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// How raw text is split into candidate terms before filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segmentation {
    /// Dictionary + HMM segmentation for Chinese text.
    #[default]
    Jieba,
    /// Text is already segmented; split on whitespace only.
    Whitespace,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    segmentation: Segmentation,
}

impl Tokenizer {
    pub fn new(segmentation: Segmentation) -> Self {
        Self { segmentation }
    }

    /// Segment `text` and keep only content terms, in segmentation order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let pieces: Vec<&str> = match self.segmentation {
            Segmentation::Jieba => JIEBA.cut(&normalized, true),
            Segmentation::Whitespace => normalized.split(' ').collect(),
        };

        pieces
            .into_iter()
            .filter(|w| keep_token(w))
            .map(str::to_string)
            .collect()
    }
}

static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\u{a0}]+").expect("static whitespace pattern"));

// CJK unified ideographs only; Latin, digits and punctuation never qualify.
static HAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\u{4e00}-\u{9fa5}]+$").expect("static han pattern"));

fn normalize_whitespace(text: &str) -> String {
    let nfc: String = text.nfc().collect();
    WHITESPACE_RE.replace_all(&nfc, " ").trim().to_string()
}

fn keep_token(w: &str) -> bool {
    w.chars().count() > 1 && !stopwords().contains(w) && HAN_RE.is_match(w)
}

/* ------------------------------ Stop words -------------------------------- */

pub fn stopwords() -> &'static HashSet<&'static str> {
    static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
        let words = [
            // particles, pronouns, auxiliaries
            "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上",
            "也", "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这",
            "与", "对", "吗", "呢", "吧", "啊", "哦", "呀", "嘛", "啦", "嗯", "哼", "哈", "嘿",
            "喂", "哎", "哟", "哇", "哒", "我们", "你们", "他们", "她们", "它们", "这个", "那个",
            "这些", "那些", "什么", "怎么", "为什么", "已经", "还有", "以及", "等等", "进行",
            "这样", "那样", "一些", "一种", "一样", "其他", "各种", "每个", "非常", "更加",
            // conjunctions and discourse markers
            "但是", "如果", "因为", "所以", "不过", "虽然", "而且", "并且", "然而", "可是", "或者",
            "还是", "不仅", "而是", "就是", "只是", "不是", "关于", "对于", "为了", "随着", "通过",
            "由于", "根据", "按照", "因此", "于是", "总之", "综上所述", "由此可见", "显而易见",
            "事实上", "实际上", "其实", "确实", "看来", "据说", "听说", "据悉", "据了解", "据报道",
            "据分析", "据估计",
            // modality and hedging
            "可以", "能够", "应该", "必须", "需要", "可能", "或许", "也许", "大概", "大约", "左右",
            "前后", "上下", "之间", "其中", "之后", "之前", "当时", "现在", "将来", "过去", "目前",
            "最近", "未来", "以后", "以前", "同时", "然后", "另外", "此外", "包括",
            "作为", "成为", "具有", "相关", "有关", "方面", "问题", "情况",
        ];
        words.into_iter().collect()
    });
    &SET
}
