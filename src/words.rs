use rand::seq::SliceRandom;

pub const DEFAULT_TOPIC: &str = "classic";

const CLASSIC: &[&str] = &[
    "apple", "jupiter", "guitar", "ocean", "pyramid", "subway", "volcano", "pancake", "tornado",
    "compass", "castle",
];
const DISNEY: &[&str] = &[
    "Cinderella",
    "Epcot",
    "Imagineer",
    "Monorail",
    "Dole Whip",
    "Haunted Mansion",
    "Tinker Bell",
    "Fantasia",
    "Skyliner",
];
const TECH: &[&str] = &[
    "firewall",
    "container",
    "webhook",
    "endpoint",
    "kernel",
    "router",
    "timestamp",
    "payload",
    "virtualization",
];
const FOOD: &[&str] = &[
    "lasagna", "sushi", "taco", "croissant", "ramen", "gelato", "barbecue", "dumpling", "paella",
];

const CATALOG: &[(&str, &[&str])] = &[
    (DEFAULT_TOPIC, CLASSIC),
    ("disney", DISNEY),
    ("tech", TECH),
    ("food", FOOD),
];

/// Lowercases the requested topic and falls back to the default topic when
/// the catalog does not know it.
pub fn resolve(topic: &str) -> &'static str {
    let lowered = topic.to_lowercase();
    CATALOG
        .iter()
        .map(|(topic, _)| *topic)
        .find(|known| *known == lowered)
        .unwrap_or(DEFAULT_TOPIC)
}

/// Picks one word uniformly at random from the topic's list. Every call is an
/// independent pick, repeats across rounds are allowed.
pub fn pick(topic: &str) -> String {
    let resolved = resolve(topic);
    let words = CATALOG
        .iter()
        .find(|(topic, _)| *topic == resolved)
        .map(|(_, words)| *words)
        .unwrap_or(CLASSIC);
    words
        .choose(&mut rand::thread_rng())
        .expect("topic lists are never empty")
        .to_string()
}

pub fn list(topic: &str) -> &'static [&'static str] {
    let resolved = resolve(topic);
    CATALOG
        .iter()
        .find(|(topic, _)| *topic == resolved)
        .map(|(_, words)| *words)
        .unwrap_or(CLASSIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_topic_ignores_case() {
        assert_eq!(resolve("Tech"), "tech");
        assert_eq!(resolve("FOOD"), "food");
    }

    #[test]
    fn resolve_unknown_topic_falls_back_to_classic() {
        assert_eq!(resolve("sports"), DEFAULT_TOPIC);
        assert_eq!(resolve(""), DEFAULT_TOPIC);
    }

    #[test]
    fn pick_returns_a_word_from_the_topic_list() {
        for _ in 0..20 {
            let word = pick("tech");
            assert!(TECH.contains(&word.as_str()));
        }
    }

    #[test]
    fn pick_with_unknown_topic_uses_classic_list() {
        let word = pick("not_a_topic");
        assert!(CLASSIC.contains(&word.as_str()));
    }
}
