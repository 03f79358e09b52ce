use tokio::sync::RwLock;

use crate::models::Receipt;

/// 本次会话的小票历史, 新的在前
///
/// 本地留存 (LocallyPersisted) 的小票只保留, 不做自动重试同步。
#[derive(Debug, Default)]
pub struct ReceiptHistory {
    receipts: RwLock<Vec<Receipt>>,
}

/// 本地分页结果
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub receipts: Vec<Receipt>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl ReceiptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn prepend(&self, receipt: Receipt) {
        self.receipts.write().await.insert(0, receipt);
    }

    /// page 从 1 起
    pub async fn page(&self, page: usize, page_size: usize) -> HistoryPage {
        let guard = self.receipts.read().await;
        let page = page.max(1);
        let page_size = page_size.max(1);
        let start = (page - 1) * page_size;
        let receipts = guard.iter().skip(start).take(page_size).cloned().collect();
        HistoryPage {
            receipts,
            total: guard.len(),
            page,
            page_size,
        }
    }

    pub async fn len(&self) -> usize {
        self.receipts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.receipts.read().await.is_empty()
    }

    pub async fn latest(&self) -> Option<Receipt> {
        self.receipts.read().await.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, ReceiptStatus};
    use chrono::Utc;

    fn receipt(number: &str) -> Receipt {
        Receipt {
            receipt_number: number.to_string(),
            server_id: None,
            customer_name: "Walk-in Customer".to_string(),
            items: Vec::new(),
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            created_at: Utc::now(),
            status: ReceiptStatus::LocallyPersisted,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn prepend_keeps_newest_first() {
        let history = ReceiptHistory::new();
        history.prepend(receipt("R-1")).await;
        history.prepend(receipt("R-2")).await;

        assert_eq!(history.latest().await.unwrap().receipt_number, "R-2");
        assert_eq!(history.len().await, 2);
    }

    #[tokio::test]
    async fn paging_is_one_based_and_bounded() {
        let history = ReceiptHistory::new();
        for i in 0..5 {
            history.prepend(receipt(&format!("R-{}", i))).await;
        }

        let first = history.page(1, 2).await;
        assert_eq!(first.receipts.len(), 2);
        assert_eq!(first.receipts[0].receipt_number, "R-4");
        assert_eq!(first.total, 5);

        let last = history.page(3, 2).await;
        assert_eq!(last.receipts.len(), 1);
        assert_eq!(last.receipts[0].receipt_number, "R-0");

        let beyond = history.page(9, 2).await;
        assert!(beyond.receipts.is_empty());
    }
}
