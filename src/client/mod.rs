pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{InventoryItem, PaymentMethod, RemoteReceipt};

/// 远端调用失败 - 提交流程里由本地留存路径消化, 不上抛给用户
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// 小票创建载荷 { items: [{productId, quantity}], paymentMethod, customerName?, storeId? }
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptPayload {
    pub items: Vec<PayloadItem>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadItem {
    pub product_id: i64,
    pub quantity: u32,
}

/// 远端小票分页
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReceiptPage {
    #[serde(default)]
    pub receipts: Vec<RemoteReceipt>,
    pub total: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// 远端 POS 后端 (小票持久化 + 商品读取)
///
/// 唯一的外部协作方边界; 测试里用桩实现替换。
#[async_trait]
pub trait PosBackend: Send + Sync {
    async fn create_receipt(
        &self,
        payload: &CreateReceiptPayload,
    ) -> Result<RemoteReceipt, ClientError>;

    async fn list_receipts(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<RemoteReceiptPage, ClientError>;

    async fn fetch_products(&self) -> Result<Vec<InventoryItem>, ClientError>;
}
