//! Grouped sums, frequency counts, and top-N rankings.
//!
//! All operations are pure and deterministic given the input order: group
//! results come out in first-seen key order, and rankings use a stable sort
//! so ties keep their original position.

use std::collections::HashMap;

use serde::Serialize;

/// One aggregated group: a distinct key and its summed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Largest,
    Smallest,
}

/// Sums values per distinct key. One output row per key, in the order keys
/// first appear in the input.
pub fn sum_by_group<I>(pairs: I) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut groups: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (key, value) in pairs {
        match index.get(&key) {
            Some(&i) => groups[i].total += value,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupTotal { key, total: value });
            }
        }
    }

    groups
}

/// Frequency count per distinct value, in first-seen order.
pub fn count_by_category<I, S>(values: I) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    sum_by_group(values.into_iter().map(|v| (v.into(), 1)))
}

/// The `n` groups with the largest or smallest totals. Ties keep their
/// input order; fewer than `n` groups returns them all.
pub fn top_n(groups: &[GroupTotal], n: usize, direction: Direction) -> Vec<GroupTotal> {
    let mut ranked = groups.to_vec();
    match direction {
        Direction::Largest => ranked.sort_by(|a, b| b.total.cmp(&a.total)),
        Direction::Smallest => ranked.sort_by(|a, b| a.total.cmp(&b.total)),
    }
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(pairs: &[(&str, u64)]) -> Vec<GroupTotal> {
        pairs
            .iter()
            .map(|(k, v)| GroupTotal {
                key: (*k).to_string(),
                total: *v,
            })
            .collect()
    }

    #[test]
    fn test_sum_by_group_totals_exactly() {
        let pairs = vec![
            ("New York".to_string(), 100),
            ("Chicago".to_string(), 50),
            ("New York".to_string(), 25),
        ];

        let result = sum_by_group(pairs);
        assert_eq!(result, groups(&[("New York", 125), ("Chicago", 50)]));
    }

    #[test]
    fn test_sum_by_group_empty_input() {
        let result = sum_by_group(Vec::<(String, u64)>::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_count_by_category() {
        let result = count_by_category(vec!["Male", "Female", "Male", "Male"]);
        assert_eq!(result, groups(&[("Male", 3), ("Female", 1)]));
    }

    #[test]
    fn test_top_n_both_directions() {
        let input = groups(&[("a", 5), ("b", 9), ("c", 1), ("d", 7)]);

        let largest = top_n(&input, 2, Direction::Largest);
        assert_eq!(largest, groups(&[("b", 9), ("d", 7)]));

        let smallest = top_n(&input, 2, Direction::Smallest);
        assert_eq!(smallest, groups(&[("c", 1), ("a", 5)]));
    }

    #[test]
    fn test_top_n_ties_keep_input_order() {
        let input = groups(&[("a", 5), ("b", 5), ("c", 5)]);

        let ranked = top_n(&input, 2, Direction::Largest);
        assert_eq!(ranked, groups(&[("a", 5), ("b", 5)]));
    }

    #[test]
    fn test_top_n_fewer_rows_than_n() {
        let input = groups(&[("a", 5)]);
        assert_eq!(top_n(&input, 5, Direction::Largest).len(), 1);
    }

    #[test]
    fn test_rankings_disjoint_on_distinct_values() {
        let input = groups(&[
            ("a", 1),
            ("b", 2),
            ("c", 3),
            ("d", 4),
            ("e", 5),
            ("f", 6),
            ("g", 7),
            ("h", 8),
            ("i", 9),
            ("j", 10),
        ]);

        let dangerous = top_n(&input, 5, Direction::Largest);
        let safest = top_n(&input, 5, Direction::Smallest);

        for g in &dangerous {
            assert!(!safest.iter().any(|s| s.key == g.key));
        }
    }
}
