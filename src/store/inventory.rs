use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::models::InventoryItem;

/// 库存容器 - 进程内单一属主, 各处通过 Arc 句柄访问
///
/// 数据来自远端商品服务, 小票提交成功后在本地乐观扣减,
/// 下次 refresh 时与远端对齐。
#[derive(Debug, Default)]
pub struct InventoryStore {
    items: RwLock<IndexMap<i64, InventoryItem>>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<InventoryItem> {
        self.items.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Option<InventoryItem> {
        self.items.read().await.get(&id).cloned()
    }

    /// 扫码回调的唯一动作: 按解码串精确查 barcode 或 SKU
    pub async fn find_by_barcode(&self, code: &str) -> Option<InventoryItem> {
        self.items
            .read()
            .await
            .values()
            .find(|item| {
                item.barcode.as_deref() == Some(code) || item.sku.as_deref() == Some(code)
            })
            .cloned()
    }

    /// 用远端拉取结果整体替换 (库存刷新)
    pub async fn replace_all(&self, items: Vec<InventoryItem>) {
        let mut guard = self.items.write().await;
        guard.clear();
        for item in items {
            guard.insert(item.id, item);
        }
    }

    pub async fn upsert(&self, item: InventoryItem) {
        self.items.write().await.insert(item.id, item);
    }

    pub async fn remove(&self, id: i64) -> bool {
        self.items.write().await.shift_remove(&id).is_some()
    }

    /// 小票提交成功后的乐观扣减, 最低扣到 0
    pub async fn decrement(&self, id: i64, quantity: u32) {
        if let Some(item) = self.items.write().await.get_mut(&id) {
            item.quantity = item.quantity.saturating_sub(quantity);
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
