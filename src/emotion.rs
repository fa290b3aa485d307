//! Keyword-based emotion classification
//!
//! Maps free text onto a fixed set of emotion labels by scoring keyword
//! presence. Pure and deterministic; the session engine calls it on both the
//! user utterance and the model reply.

use serde::{Deserialize, Serialize};

/// Closed set of emotions the companion can express
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Thinking,
    Sleep,
    Scared,
    Neutral,
}

impl EmotionLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Thinking => "thinking",
            Self::Sleep => "sleep",
            Self::Scared => "scared",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword lists per label, scanned in this fixed order.
///
/// A label takes the lead only with a strictly higher score than the running
/// maximum, so ties keep the earliest leader and an all-zero scan stays
/// neutral.
const EMOTION_KEYWORDS: &[(EmotionLabel, &[&str])] = &[
    (
        EmotionLabel::Happy,
        &[
            "谢谢你", "开心", "你好棒", "感谢", "棒", "好", "喜欢", "爱", "哈哈",
        ],
    ),
    (
        EmotionLabel::Sad,
        &["难过", "伤心", "失望", "不开心", "想哭", "委屈"],
    ),
    (
        EmotionLabel::Angry,
        &["烦", "讨厌", "生气", "烦躁", "郁闷", "气死"],
    ),
    (
        EmotionLabel::Thinking,
        &[
            "为什么", "请解释", "解释一下", "怎么", "如何", "是什么", "什么意思",
        ],
    ),
    (
        EmotionLabel::Sleep,
        &["晚安", "休息", "睡觉", "睡吧", "累了", "困了", "goodnight"],
    ),
    (
        EmotionLabel::Scared,
        &["害怕", "好可怕", "吓", "恐怖", "担心"],
    ),
];

/// Classify the emotion of a piece of text
///
/// Each label scores one point per keyword found in the lowercased text;
/// the label with the strictly highest score wins, `Neutral` otherwise.
#[must_use]
pub fn classify(text: &str) -> EmotionLabel {
    let normalized = text.to_lowercase();

    let mut detected = EmotionLabel::Neutral;
    let mut max_score = 0;

    for (label, keywords) in EMOTION_KEYWORDS {
        let score = keywords
            .iter()
            .filter(|keyword| normalized.contains(*keyword))
            .count();

        if score > max_score {
            max_score = score;
            detected = *label;
        }
    }

    detected
}

/// Animation frames for an emotion, cycled by the feedback animator
#[must_use]
pub const fn frames(emotion: EmotionLabel) -> &'static [&'static str] {
    match emotion {
        EmotionLabel::Happy => &["smile_1.bmp", "smile_2.bmp", "smile_3.bmp"],
        EmotionLabel::Sad => &["sad_1.bmp", "sad_2.bmp", "sad_3.bmp"],
        EmotionLabel::Angry => &["angry_1.bmp", "angry_2.bmp", "angry_3.bmp"],
        EmotionLabel::Thinking => &["think_1.bmp", "think_2.bmp", "think_3.bmp"],
        EmotionLabel::Sleep => &["sleep_1.bmp", "sleep_2.bmp", "sleep_3.bmp"],
        EmotionLabel::Scared => &["scared_1.bmp", "scared_2.bmp", "scared_3.bmp"],
        EmotionLabel::Neutral => &["neutral_1.bmp", "neutral_2.bmp", "neutral_3.bmp"],
    }
}
