//! System-message composition

use crate::memory::Preferences;

/// Compose the system message content from the persona text and what has
/// been learned about the user
///
/// The memory block is left out while neither likes nor interests have been
/// learned; dislikes alone do not warrant one. When present it lists every
/// non-empty category.
#[must_use]
pub fn build_system_prompt(persona: &str, preferences: &Preferences) -> String {
    if preferences.likes.is_empty() && preferences.interests.is_empty() {
        return persona.to_string();
    }

    let mut prompt = format!("{persona}\n\n关于主人的记忆：");

    for (label, items) in [
        ("喜欢", &preferences.likes),
        ("不喜欢", &preferences.dislikes),
        ("感兴趣", &preferences.interests),
    ] {
        if !items.is_empty() {
            prompt.push_str(&format!("\n- {label}：{}", items.join("、")));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSONA: &str = "你是小Lumi";

    #[test]
    fn test_persona_only_when_nothing_learned() {
        let prompt = build_system_prompt(PERSONA, &Preferences::default());
        assert_eq!(prompt, PERSONA);
    }

    #[test]
    fn test_dislikes_alone_do_not_add_block() {
        let prefs = Preferences {
            dislikes: vec!["打雷".to_string()],
            ..Default::default()
        };

        assert_eq!(build_system_prompt(PERSONA, &prefs), PERSONA);
    }

    #[test]
    fn test_likes_render() {
        let prefs = Preferences {
            likes: vec!["猫".to_string(), "画画".to_string()],
            ..Default::default()
        };

        let prompt = build_system_prompt(PERSONA, &prefs);

        assert!(prompt.starts_with(PERSONA));
        assert!(prompt.contains("关于主人的记忆"));
        assert!(prompt.contains("- 喜欢：猫、画画"));
        assert!(!prompt.contains("不喜欢"));
        assert!(!prompt.contains("感兴趣"));
    }

    #[test]
    fn test_all_categories_render_once_likes_present() {
        let prefs = Preferences {
            likes: vec!["猫".to_string()],
            dislikes: vec!["打雷".to_string()],
            interests: vec!["天文".to_string()],
        };

        let prompt = build_system_prompt(PERSONA, &prefs);

        assert!(prompt.contains("- 喜欢：猫"));
        assert!(prompt.contains("- 不喜欢：打雷"));
        assert!(prompt.contains("- 感兴趣：天文"));
    }

    #[test]
    fn test_interests_alone_add_block() {
        let prefs = Preferences {
            interests: vec!["恐龙".to_string()],
            ..Default::default()
        };

        let prompt = build_system_prompt(PERSONA, &prefs);
        assert!(prompt.contains("- 感兴趣：恐龙"));
    }
}
