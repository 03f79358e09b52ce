use serde::{Deserialize, Serialize};

use super::inventory::InventoryItem;

/// OCR/扫码流水线产出的候选商品行, 只在匹配过程中存活
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedCandidate {
    pub name: String,
    pub price: f64,
    /// 未解析出数量时默认 1
    pub quantity: u32,
}

/// 候选与库存商品的配对 (命中或疑似)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMatch {
    pub item: InventoryItem,
    pub candidate: ScannedCandidate,
    pub confidence: f64,
}

/// 三个互斥分桶: 命中自动入车, 疑似待确认, 未命中走手工添加
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBuckets {
    pub matched_items: Vec<ScoredMatch>,
    pub partial_matches: Vec<ScoredMatch>,
    pub unmatched_items: Vec<ScannedCandidate>,
}
