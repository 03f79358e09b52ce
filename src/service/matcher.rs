use crate::config::MatchConfig;
use crate::models::{InventoryItem, MatchBuckets, ScannedCandidate, ScoredMatch};

/// 候选-库存匹配引擎: 分层打分 + 双阈值分桶
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// 每个候选对全量库存打分, 取最高分商品;
    /// 同分取 ID 较小者, 保证结果确定。
    /// 分桶: >= exact 命中, >= partial 疑似, 否则未命中。
    pub fn match_candidates(
        &self,
        candidates: &[ScannedCandidate],
        inventory: &[InventoryItem],
    ) -> MatchBuckets {
        let mut buckets = MatchBuckets::default();

        for candidate in candidates {
            let candidate_name = normalize_name(&candidate.name);

            let mut best: Option<(f64, &InventoryItem)> = None;
            for item in inventory {
                let score = score_names(&candidate_name, &normalize_name(&item.name));
                let is_better = match &best {
                    None => true,
                    Some((best_score, best_item)) => {
                        score > *best_score || (score == *best_score && item.id < best_item.id)
                    }
                };
                if is_better {
                    best = Some((score, item));
                }
            }

            match best {
                Some((score, item)) if score >= self.config.exact_match_threshold => {
                    buckets.matched_items.push(ScoredMatch {
                        item: item.clone(),
                        candidate: candidate.clone(),
                        confidence: score,
                    });
                }
                Some((score, item)) if score >= self.config.partial_match_threshold => {
                    buckets.partial_matches.push(ScoredMatch {
                        item: item.clone(),
                        candidate: candidate.clone(),
                        confidence: score,
                    });
                }
                _ => buckets.unmatched_items.push(candidate.clone()),
            }
        }

        buckets
    }
}

/// 分层打分: 等值 1.0 > 互相包含 0.95 > jaro-winkler 模糊带
/// (jaro-winkler 对音译/错拼的单字符差异有容忍度)
fn score_names(candidate: &str, item: &str) -> f64 {
    if candidate.is_empty() || item.is_empty() {
        return 0.0;
    }
    if candidate == item {
        return 1.0;
    }
    if candidate.contains(item) || item.contains(candidate) {
        return 0.95;
    }
    strsim::jaro_winkler(candidate, item)
}

/// 小写化 + 压缩空白
fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MatchEngine {
        MatchEngine::new(MatchConfig::default())
    }

    fn item(id: i64, name: &str) -> InventoryItem {
        InventoryItem {
            id,
            name: name.to_string(),
            price: 1.0,
            quantity: 10,
            category: String::new(),
            sku: None,
            barcode: None,
        }
    }

    fn candidate(name: &str) -> ScannedCandidate {
        ScannedCandidate {
            name: name.to_string(),
            price: 1.0,
            quantity: 1,
        }
    }

    #[test]
    fn exact_name_matches_with_full_confidence() {
        let buckets = engine().match_candidates(
            &[candidate("Coffee")],
            &[item(1, "Coffee"), item(2, "Tea")],
        );
        assert_eq!(buckets.matched_items.len(), 1);
        assert_eq!(buckets.matched_items[0].item.id, 1);
        assert_eq!(buckets.matched_items[0].confidence, 1.0);
        assert!(buckets.partial_matches.is_empty());
        assert!(buckets.unmatched_items.is_empty());
    }

    #[test]
    fn containment_matches_case_insensitively_in_either_direction() {
        let buckets = engine().match_candidates(
            &[candidate("ICED COFFEE"), candidate("Tea")],
            &[item(1, "Coffee"), item(2, "Green Tea 500ml")],
        );
        // "iced coffee" ⊇ "coffee", "tea" ⊆ "green tea 500ml"
        assert_eq!(buckets.matched_items.len(), 2);
        assert_eq!(buckets.matched_items[0].confidence, 0.95);
        assert_eq!(buckets.matched_items[1].item.id, 2);
    }

    #[test]
    fn typo_lands_in_partial_band() {
        let buckets = engine().match_candidates(&[candidate("Koffee")], &[item(1, "Coffee")]);
        assert!(buckets.matched_items.is_empty());
        assert_eq!(buckets.partial_matches.len(), 1);
        let confidence = buckets.partial_matches[0].confidence;
        assert!(confidence >= 0.6 && confidence < 0.9);
    }

    #[test]
    fn unrelated_name_is_unmatched() {
        let buckets = engine().match_candidates(&[candidate("Umbrella")], &[item(1, "Coffee")]);
        assert!(buckets.matched_items.is_empty());
        assert!(buckets.partial_matches.is_empty());
        assert_eq!(buckets.unmatched_items.len(), 1);
        assert_eq!(buckets.unmatched_items[0].name, "Umbrella");
    }

    #[test]
    fn equal_scores_resolve_to_lowest_item_id() {
        // 两个同名商品对候选打出同分, 取 ID 小的
        let buckets = engine().match_candidates(
            &[candidate("Coffee")],
            &[item(9, "Coffee"), item(3, "Coffee")],
        );
        assert_eq!(buckets.matched_items[0].item.id, 3);
    }

    #[test]
    fn empty_inventory_leaves_everything_unmatched() {
        let buckets = engine().match_candidates(&[candidate("Coffee")], &[]);
        assert_eq!(buckets.unmatched_items.len(), 1);
    }

    #[test]
    fn each_candidate_lands_in_exactly_one_bucket() {
        let buckets = engine().match_candidates(
            &[candidate("Coffee"), candidate("Koffee"), candidate("Umbrella")],
            &[item(1, "Coffee")],
        );
        let total = buckets.matched_items.len()
            + buckets.partial_matches.len()
            + buckets.unmatched_items.len();
        assert_eq!(total, 3);
        assert_eq!(buckets.matched_items.len(), 1);
        assert_eq!(buckets.partial_matches.len(), 1);
        assert_eq!(buckets.unmatched_items.len(), 1);
    }
}
