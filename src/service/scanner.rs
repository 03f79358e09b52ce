use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

use super::cart::CartService;
use super::matcher::MatchEngine;
use crate::error::PosError;
use crate::models::{CartLine, ScannedCandidate, ScoredMatch};
use crate::store::InventoryStore;

/// 小票页脚关键词, 命中整行丢弃 (含缅文小票的合计/税/找零行)
const FOOTER_KEYWORDS: &[&str] = &[
    "subtotal",
    "sub total",
    "total",
    "tax",
    "tip",
    "change",
    "discount",
    "amount due",
    "balance",
    "cash",
    "စုစုပေါင်း",
    "အခွန်",
    "ပြန်အမ်း",
];

/// 按行解析 OCR 文本, 产出候选商品行, 顺序跟随输入
pub fn parse_receipt_text(raw: &str) -> Vec<ScannedCandidate> {
    raw.lines().filter_map(parse_line).collect()
}

/// 单行解析: 可选 `N x` 数量前缀 + 名称 + 金额 + 货币后缀 (MMK / Ks 两种记法)
fn parse_line(line: &str) -> Option<ScannedCandidate> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    if FOOTER_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return None;
    }

    let re =
        Regex::new(r"(?i)^(?:(\d+)\s*[x×]\s+)?(.*?)[\s.]*([\d,]+(?:\.\d+)?)\s*(?:MMK|Ks)$").ok()?;
    let caps = re.captures(trimmed)?;

    let quantity = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|q| *q >= 1)
        .unwrap_or(1);

    let name = clean_name(caps.get(2)?.as_str());
    if name.chars().count() <= 2 {
        return None;
    }

    let price = parse_amount(caps.get(3)?.as_str())?;
    Some(ScannedCandidate {
        name,
        price,
        quantity,
    })
}

/// 金额解析: 带小数点按原值, 纯整数按最小货币单位记 (除以 100)
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    if cleaned.contains('.') {
        cleaned.parse::<f64>().ok()
    } else {
        cleaned.parse::<i64>().ok().map(|v| v as f64 / 100.0)
    }
}

/// 压缩空白并剥掉首尾装饰符号
fn clean_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, '-' | ':' | '.' | '*' | '#'))
        .trim()
        .to_string()
}

/// 扫描流程产出: 命中已自动入车 (含逐项失败), 疑似与未命中交给用户
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub added: Vec<CartLine>,
    pub failed: Vec<ScanFailure>,
    pub partial_matches: Vec<ScoredMatch>,
    pub unmatched_items: Vec<ScannedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFailure {
    pub item_id: i64,
    pub name: String,
    pub reason: String,
}

/// 扫描编排: 解析 -> 匹配 -> 命中项自动入车
pub struct ScanService {
    engine: MatchEngine,
    inventory: Arc<InventoryStore>,
    cart: Arc<CartService>,
}

impl ScanService {
    pub fn new(engine: MatchEngine, inventory: Arc<InventoryStore>, cart: Arc<CartService>) -> Self {
        Self {
            engine,
            inventory,
            cart,
        }
    }

    pub async fn process_scan(&self, raw_text: &str) -> Result<ScanOutcome, PosError> {
        if raw_text.trim().is_empty() {
            return Err(PosError::NoRecognizableText);
        }

        let candidates = parse_receipt_text(raw_text);
        if candidates.is_empty() {
            return Err(PosError::NoItemsExtracted);
        }

        let inventory = self.inventory.list().await;
        let buckets = self.engine.match_candidates(&candidates, &inventory);

        let mut added = Vec::new();
        let mut failed = Vec::new();
        for matched in buckets.matched_items {
            match self
                .cart
                .add_item(matched.item.id, matched.candidate.quantity)
                .await
            {
                Ok(line) => added.push(line),
                // 单行失败不中断整批, 逐项上报
                Err(e) => failed.push(ScanFailure {
                    item_id: matched.item.id,
                    name: matched.item.name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        tracing::info!(
            "扫描匹配完成: 入车 {}, 失败 {}, 疑似 {}, 未命中 {}",
            added.len(),
            failed.len(),
            buckets.partial_matches.len(),
            buckets.unmatched_items.len()
        );

        Ok(ScanOutcome {
            added,
            failed,
            partial_matches: buckets.partial_matches,
            unmatched_items: buckets.unmatched_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, CreateReceiptPayload, PosBackend, RemoteReceiptPage};
    use crate::config::MatchConfig;
    use crate::models::{InventoryItem, RemoteReceipt};
    use crate::store::ReceiptHistory;
    use async_trait::async_trait;

    #[test]
    fn footer_lines_are_discarded_by_denylist() {
        let candidates =
            parse_receipt_text("Coffee 1500 MMK\nSUBTOTAL 1500 MMK\nTAX 120 MMK\nCHANGE 0 MMK");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Coffee");
        assert_eq!(candidates[0].price, 15.0);
        assert_eq!(candidates[0].quantity, 1);
    }

    #[test]
    fn burmese_footer_lines_are_discarded_too() {
        let candidates = parse_receipt_text("Lahpet Thoke 3500 MMK\nစုစုပေါင်း 3500 MMK");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Lahpet Thoke");
    }

    #[test]
    fn both_currency_notations_parse() {
        let candidates = parse_receipt_text("Latte 2,500 Ks\nMocha 3.50 MMK");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].price, 25.0); // 整数金额按最小单位折算
        assert_eq!(candidates[1].price, 3.5); // 带小数点的按原值
    }

    #[test]
    fn quantity_prefix_is_honored() {
        let candidates = parse_receipt_text("2 x Espresso 1800 MMK\nTea 900 Ks");
        assert_eq!(candidates[0].quantity, 2);
        assert_eq!(candidates[0].name, "Espresso");
        assert_eq!(candidates[1].quantity, 1);
    }

    #[test]
    fn short_names_and_priceless_lines_are_dropped() {
        let candidates = parse_receipt_text("Ko 500 MMK\nJust some words\nThanks for visiting");
        assert!(candidates.is_empty());
    }

    #[test]
    fn candidate_order_follows_input_order() {
        let candidates = parse_receipt_text("Tea 900 MMK\nCoffee 1500 MMK");
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tea", "Coffee"]);
    }

    struct NoopBackend;

    #[async_trait]
    impl PosBackend for NoopBackend {
        async fn create_receipt(
            &self,
            _payload: &CreateReceiptPayload,
        ) -> Result<RemoteReceipt, ClientError> {
            Ok(RemoteReceipt::default())
        }

        async fn list_receipts(
            &self,
            _page: u32,
            _page_size: u32,
        ) -> Result<RemoteReceiptPage, ClientError> {
            Ok(RemoteReceiptPage::default())
        }

        async fn fetch_products(&self) -> Result<Vec<InventoryItem>, ClientError> {
            Ok(Vec::new())
        }
    }

    fn item(id: i64, name: &str, quantity: u32) -> InventoryItem {
        InventoryItem {
            id,
            name: name.to_string(),
            price: 15.0,
            quantity,
            category: String::new(),
            sku: None,
            barcode: None,
        }
    }

    async fn scan_service(items: Vec<InventoryItem>) -> (ScanService, Arc<CartService>) {
        let inventory = Arc::new(InventoryStore::new());
        inventory.replace_all(items).await;
        let history = Arc::new(ReceiptHistory::new());
        let cart = Arc::new(CartService::new(
            inventory.clone(),
            history,
            Arc::new(NoopBackend),
            None,
        ));
        let service = ScanService::new(
            MatchEngine::new(MatchConfig::default()),
            inventory,
            cart.clone(),
        );
        (service, cart)
    }

    #[tokio::test]
    async fn blank_and_unusable_text_report_distinct_errors() {
        let (service, _) = scan_service(Vec::new()).await;
        assert_eq!(
            service.process_scan("   \n  ").await.unwrap_err(),
            PosError::NoRecognizableText
        );
        assert_eq!(
            service.process_scan("nothing here").await.unwrap_err(),
            PosError::NoItemsExtracted
        );
    }

    #[tokio::test]
    async fn matched_items_are_added_partials_and_unmatched_surface_untouched() {
        let (service, cart) =
            scan_service(vec![item(1, "Coffee", 10), item(2, "Green Tea", 10)]).await;

        let outcome = service
            .process_scan("Coffee 1500 MMK\nKoffee 1500 MMK\nUmbrella 9900 MMK")
            .await
            .unwrap();

        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.added[0].item_id, 1);
        assert_eq!(outcome.partial_matches.len(), 1);
        assert_eq!(outcome.partial_matches[0].item.id, 1);
        assert_eq!(outcome.unmatched_items.len(), 1);
        assert_eq!(outcome.unmatched_items[0].name, "Umbrella");

        // 疑似与未命中不动购物车
        assert_eq!(cart.view().await.lines.len(), 1);
    }

    #[tokio::test]
    async fn stock_violations_apply_partially_and_report_per_item() {
        let (service, cart) = scan_service(vec![item(1, "Coffee", 1), item(2, "Tea", 5)]).await;

        let outcome = service
            .process_scan("2 x Coffee 1500 MMK\nTea 900 MMK")
            .await
            .unwrap();

        // Coffee 库存只有 1, 请求 2 -> 逐项失败; Tea 照常入车
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].item_id, 1);
        assert!(outcome.failed[0].reason.contains("insufficient stock"));
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.added[0].item_id, 2);
        assert_eq!(cart.view().await.lines.len(), 1);
    }
}
