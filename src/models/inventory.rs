use serde::{Deserialize, Serialize};

/// 库存商品 (远端商品服务的只读镜像, 提交小票后乐观扣减)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// 在库数量
    pub quantity: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}
