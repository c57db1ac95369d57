//! Article title synthesis from per-category templates.

use crate::config::ArticleConfig;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::BTreeMap;

/// Picks a template for a category and fills its `{slot}` placeholders.
pub struct TitleSynthesizer<'a> {
    templates: &'a BTreeMap<String, Vec<String>>,
    fallback: &'a [String],
    slots: &'a BTreeMap<String, Vec<String>>,
}

impl<'a> TitleSynthesizer<'a> {
    pub fn new(config: &'a ArticleConfig) -> Self {
        Self {
            templates: &config.title_templates,
            fallback: &config.fallback_templates,
            slots: &config.title_slots,
        }
    }

    /// Synthesize a title for `category`.
    pub fn synthesize(&self, category: &str, rng: &mut dyn RngCore) -> String {
        let bank = self
            .templates
            .get(category)
            .filter(|templates| !templates.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(self.fallback);

        match bank.choose(rng) {
            Some(template) => fill_template(template, self.slots, rng),
            None => String::new(),
        }
    }
}

/// Replace each `{name}` with a value drawn from `slots[name]`.
///
/// Only placeholders present in the template are drawn. Placeholders without a
/// (non-empty) pool and unbalanced braces are copied through unchanged.
pub fn fill_template(
    template: &str,
    slots: &BTreeMap<String, Vec<String>>,
    rng: &mut dyn RngCore,
) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match slots.get(name).and_then(|values| values.choose(rng)) {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    fn slots() -> BTreeMap<String, Vec<String>> {
        let mut slots = BTreeMap::new();
        slots.insert("team".to_string(), vec!["Lakers".to_string()]);
        slots.insert("percent".to_string(), vec!["12".to_string()]);
        slots
    }

    #[test]
    fn test_fills_known_slots() {
        let mut rng = seeded_rng(0);
        let title = fill_template("{team} Up {percent}% Today", &slots(), &mut rng);
        assert_eq!(title, "Lakers Up 12% Today");
    }

    #[test]
    fn test_unknown_slot_left_literal() {
        let mut rng = seeded_rng(0);
        let title = fill_template("{team} vs {opponent}", &slots(), &mut rng);
        assert_eq!(title, "Lakers vs {opponent}");
    }

    #[test]
    fn test_unbalanced_brace_copied_through() {
        let mut rng = seeded_rng(0);
        assert_eq!(fill_template("Odd {team", &slots(), &mut rng), "Odd {team");
        assert_eq!(fill_template("No slots here", &slots(), &mut rng), "No slots here");
    }

    #[test]
    fn test_default_bank_fills_every_slot() {
        let config = ArticleConfig::default();
        let synth = TitleSynthesizer::new(&config);
        let mut rng = seeded_rng(9);

        for category in ["sports", "finance", "lifestyle", "news", "opinion"] {
            for _ in 0..50 {
                let title = synth.synthesize(category, &mut rng);
                assert!(!title.is_empty());
                assert!(!title.contains('{'), "unfilled slot in {:?}", title);
            }
        }
    }

    #[test]
    fn test_unknown_category_uses_fallback() {
        let config = ArticleConfig::default();
        let synth = TitleSynthesizer::new(&config);
        let mut rng = seeded_rng(10);

        let title = synth.synthesize("science", &mut rng);
        assert!(
            title.ends_with("What You Need to Know Today") || title.starts_with("Analysis:"),
            "{}",
            title
        );
    }
}
