use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{PaymentMethod, WALK_IN_CUSTOMER};

/// 小票明细行 (定稿后不再变更)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

/// 小票状态: 远端确认 / 本地留存 (待同步, 无 server_id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Committed,
    LocallyPersisted,
}

/// 规范化小票 - 内部只认这一种形态, 两套历史字段名在边界处折算
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: String,
    /// None 即本地留存, 等下次同步
    pub server_id: Option<i64>,
    pub customer_name: String,
    pub items: Vec<ReceiptLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub status: ReceiptStatus,
    pub payment_method: PaymentMethod,
}

/// 对外序列化形态: 历史上两套字段名并存 (tax/taxAmount, total/totalAmount,
/// dateTime/createdAt), 兼容起见两套都填
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptWire {
    pub receipt_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<i64>,
    pub customer_name: String,
    pub items: Vec<ReceiptLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub total_amount: f64,
    pub date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: ReceiptStatus,
    pub payment_method: PaymentMethod,
}

impl From<&Receipt> for ReceiptWire {
    fn from(r: &Receipt) -> Self {
        Self {
            receipt_number: r.receipt_number.clone(),
            server_id: r.server_id,
            customer_name: r.customer_name.clone(),
            items: r.items.clone(),
            subtotal: r.subtotal,
            tax: r.tax,
            tax_amount: r.tax,
            total: r.total,
            total_amount: r.total,
            date_time: r.created_at,
            created_at: r.created_at,
            status: r.status,
            payment_method: r.payment_method,
        }
    }
}

/// 远端返回的小票, 两套字段名都能读 (alias)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReceipt {
    pub id: Option<i64>,
    pub receipt_number: Option<String>,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<RemoteReceiptLine>,
    pub subtotal: Option<f64>,
    #[serde(alias = "tax")]
    pub tax_amount: Option<f64>,
    #[serde(alias = "total")]
    pub total_amount: Option<f64>,
    #[serde(alias = "dateTime")]
    pub created_at: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReceiptLine {
    #[serde(alias = "itemId")]
    pub product_id: i64,
    pub name: Option<String>,
    #[serde(alias = "unitPrice")]
    pub price: Option<f64>,
    pub quantity: u32,
    pub line_total: Option<f64>,
}

impl RemoteReceipt {
    /// 以本地草稿为兜底归并远端字段, 产出 Committed 小票
    pub fn normalize(self, draft: Receipt) -> Receipt {
        let items = if self.items.is_empty() {
            draft.items
        } else {
            self.items.into_iter().map(RemoteReceiptLine::normalize).collect()
        };

        Receipt {
            receipt_number: self
                .receipt_number
                .or_else(|| self.id.map(|id| format!("R-{}", id)))
                .unwrap_or(draft.receipt_number),
            server_id: self.id,
            customer_name: self.customer_name.unwrap_or(draft.customer_name),
            items,
            subtotal: self.subtotal.unwrap_or(draft.subtotal),
            tax: self.tax_amount.unwrap_or(draft.tax),
            total: self.total_amount.unwrap_or(draft.total),
            created_at: self.created_at.unwrap_or(draft.created_at),
            status: ReceiptStatus::Committed,
            payment_method: self.payment_method.unwrap_or(draft.payment_method),
        }
    }

    /// 无本地草稿的归一化 (远端列表查询)
    pub fn normalize_bare(self) -> Receipt {
        let draft = Receipt {
            receipt_number: "R-0".to_string(),
            server_id: None,
            customer_name: WALK_IN_CUSTOMER.to_string(),
            items: Vec::new(),
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            // 远端未带时间戳时落到纪元零点, 不伪造当前时间
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            status: ReceiptStatus::Committed,
            payment_method: PaymentMethod::Cash,
        };
        self.normalize(draft)
    }
}

impl RemoteReceiptLine {
    fn normalize(self) -> ReceiptLine {
        let price = self.price.unwrap_or(0.0);
        ReceiptLine {
            item_id: self.product_id,
            name: self.name.unwrap_or_default(),
            unit_price: price,
            quantity: self.quantity,
            line_total: self.line_total.unwrap_or(price * self.quantity as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_receipt() -> Receipt {
        Receipt {
            receipt_number: "R-42".to_string(),
            server_id: Some(42),
            customer_name: "Ma Hla".to_string(),
            items: vec![ReceiptLine {
                item_id: 1,
                name: "Coffee".to_string(),
                unit_price: 2.5,
                quantity: 2,
                line_total: 5.0,
            }],
            subtotal: 5.0,
            tax: 0.4,
            total: 5.4,
            created_at: Utc::now(),
            status: ReceiptStatus::Committed,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn wire_form_populates_both_naming_conventions() {
        let wire = ReceiptWire::from(&sample_receipt());
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["tax"], json["taxAmount"]);
        assert_eq!(json["total"], json["totalAmount"]);
        assert_eq!(json["dateTime"], json["createdAt"]);
        assert_eq!(json["total"].as_f64().unwrap(), 5.4);
    }

    #[test]
    fn remote_receipt_accepts_either_field_name() {
        let old_style: RemoteReceipt = serde_json::from_value(serde_json::json!({
            "id": 7,
            "tax": 0.4,
            "total": 5.4,
            "dateTime": "2026-01-05T09:30:00Z"
        }))
        .unwrap();
        let new_style: RemoteReceipt = serde_json::from_value(serde_json::json!({
            "id": 7,
            "taxAmount": 0.4,
            "totalAmount": 5.4,
            "createdAt": "2026-01-05T09:30:00Z"
        }))
        .unwrap();

        assert_eq!(old_style.tax_amount, Some(0.4));
        assert_eq!(old_style.total_amount, Some(5.4));
        assert_eq!(old_style.tax_amount, new_style.tax_amount);
        assert_eq!(old_style.created_at, new_style.created_at);
    }

    #[test]
    fn normalize_overlays_server_fields_onto_draft() {
        let draft = Receipt {
            receipt_number: "L-123".to_string(),
            server_id: None,
            status: ReceiptStatus::LocallyPersisted,
            ..sample_receipt()
        };
        let remote = RemoteReceipt {
            id: Some(99),
            receipt_number: Some("R-99".to_string()),
            total_amount: Some(5.4),
            ..RemoteReceipt::default()
        };

        let receipt = remote.normalize(draft);
        assert_eq!(receipt.receipt_number, "R-99");
        assert_eq!(receipt.server_id, Some(99));
        assert_eq!(receipt.status, ReceiptStatus::Committed);
        // 服务端没回传的字段保留本地计算值
        assert_eq!(receipt.subtotal, 5.0);
        assert_eq!(receipt.items.len(), 1);
    }
}
