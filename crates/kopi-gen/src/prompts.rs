//! Prompt text sent to the model.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Instructions sent as the system message with every request.
pub const SYSTEM_PROMPT: &str = r#"You are an expert frontend engineer. Create sophisticated Tailwind CSS components.

REQUIREMENTS:
- Return ONLY valid JSON, no explanations
- Do NOT use template literals or backticks
- Create complete, professional components
- Include interactive features (hover effects, animations, JavaScript when needed)
- Use advanced Tailwind features (gradients, transforms, shadows)
- Make components responsive and modern
- Include external libraries when appropriate (Chart.js, Google Fonts)
- Create production-ready, premium-quality components

JSON format:
{
  "title": "Component Name",
  "code": "Complete HTML with head, styles, scripts, and sophisticated design",
  "categories": ["category"],
  "description": "Detailed description of features"
}"#;

pub const CATEGORIES: &[&str] = &[
    "dashboard",
    "card",
    "form",
    "navigation",
    "button",
    "modal",
    "table",
    "notification",
    "calendar",
    "chat",
    "social media",
    "e-commerce",
    "blog",
    "portfolio",
    "landing page",
    "admin panel",
    "pricing",
    "testimonial",
];

pub const TYPES: &[&str] = &[
    "component", "widget", "section", "layout", "element", "module", "block",
];

pub const STYLES: &[&str] = &[
    "modern",
    "minimalist",
    "colorful",
    "dark theme",
    "gradient",
    "glass morphism",
    "neumorphism",
    "retro",
    "futuristic",
    "clean",
    "elegant",
    "playful",
];

/// Draws per requested prompt before giving up on finding a new combination.
const ATTEMPTS_PER_PROMPT: usize = 20;

/// Wrap a short request in the user message sent to the model.
pub fn user_prompt(prompt: &str) -> String {
    format!(
        "{}. Create a sophisticated component with multiple interactive elements, modern design, and professional quality.",
        prompt.trim_end_matches('.')
    )
}

/// Draw up to `count` distinct prompts from the style, category and type
/// vocabularies.
pub fn unique_prompts<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut prompts = Vec::with_capacity(count);

    for _ in 0..count.saturating_mul(ATTEMPTS_PER_PROMPT) {
        if prompts.len() == count {
            break;
        }

        let (Some(style), Some(category), Some(kind)) = (
            STYLES.choose(rng),
            CATEGORIES.choose(rng),
            TYPES.choose(rng),
        ) else {
            break;
        };

        let prompt = format!(
            "Create a {} {} {} with interactive features and responsive design using Tailwind CSS",
            style, category, kind
        );
        if seen.insert(prompt.clone()) {
            prompts.push(prompt);
        }
    }

    if prompts.len() < count {
        tracing::warn!(
            "Only {} distinct prompts available, {} requested",
            prompts.len(),
            count
        );
    }

    prompts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn prompts_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);

        let prompts = unique_prompts(25, &mut rng);

        assert_eq!(prompts.len(), 25);
        let distinct: HashSet<_> = prompts.iter().collect();
        assert_eq!(distinct.len(), 25);
    }

    #[test]
    fn prompts_follow_the_template() {
        let mut rng = StdRng::seed_from_u64(1);

        for prompt in unique_prompts(5, &mut rng) {
            assert!(prompt.starts_with("Create a "));
            assert!(prompt.ends_with("with interactive features and responsive design using Tailwind CSS"));
            assert!(CATEGORIES.iter().any(|c| prompt.contains(c)));
        }
    }

    #[test]
    fn zero_count_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(0);

        assert!(unique_prompts(0, &mut rng).is_empty());
    }

    #[test]
    fn user_prompt_appends_quality_request() {
        assert_eq!(
            user_prompt("Create a card."),
            "Create a card. Create a sophisticated component with multiple interactive elements, modern design, and professional quality."
        );
    }
}
