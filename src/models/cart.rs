use serde::{Deserialize, Serialize};

/// 未填写客户名时的散客占位值
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// 固定税率 8%
pub const TAX_RATE: f64 = 0.08;

/// 购物车行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
    /// 插入/刷新时记下的在库数量, 后续改数量只对快照校验, 不回查库存
    pub stock_snapshot: u32,
}

impl CartLine {
    pub fn recompute_total(&mut self) {
        self.line_total = self.unit_price * self.quantity as f64;
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Mobile,
}

/// 金额仅在展示时取两位小数, 存储值不做舍入
pub fn display_amount(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
