use std::collections::HashMap;

use crate::models::Week;

/// Normalized content at or below this many characters is never flagged.
pub const MIN_REPEATED_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedContent {
    pub normalized_content: String,
    pub week_numbers: Vec<i32>,
}

impl RepeatedContent {
    pub fn excerpt(&self, max_chars: usize) -> String {
        self.normalized_content.chars().take(max_chars).collect()
    }
}

pub fn normalize_content(content: &str) -> String {
    content.trim().to_lowercase()
}

/// Groups weeks whose normalized content is identical and longer than
/// [`MIN_REPEATED_LEN`] characters.
///
/// Groups come out in order of first occurrence, and week numbers inside a
/// group keep their input order.
pub fn find_repeated_content(weeks: &[Week]) -> Vec<RepeatedContent> {
    let mut groups: Vec<RepeatedContent> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for week in weeks {
        let normalized = normalize_content(&week.content);
        if normalized.chars().count() <= MIN_REPEATED_LEN {
            continue;
        }

        match index.get(&normalized) {
            Some(&slot) => {
                let group = &mut groups[slot];
                if !group.week_numbers.contains(&week.week_number) {
                    group.week_numbers.push(week.week_number);
                }
            }
            None => {
                index.insert(normalized.clone(), groups.len());
                groups.push(RepeatedContent {
                    normalized_content: normalized,
                    week_numbers: vec![week.week_number],
                });
            }
        }
    }

    groups.retain(|g| g.week_numbers.len() >= 2);
    groups
}
