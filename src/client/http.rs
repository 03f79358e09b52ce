use async_trait::async_trait;

use super::{ClientError, CreateReceiptPayload, PosBackend, RemoteReceiptPage};
use crate::models::{InventoryItem, RemoteReceipt};

/// 远端 POS 后端的 REST 客户端
///
/// 不设请求超时: 提交在途时只占住 submitting 标记, 不阻塞其他操作。
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PosBackend for HttpBackend {
    async fn create_receipt(
        &self,
        payload: &CreateReceiptPayload,
    ) -> Result<RemoteReceipt, ClientError> {
        let receipt = self
            .client
            .post(self.url("/api/receipts"))
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteReceipt>()
            .await?;
        Ok(receipt)
    }

    async fn list_receipts(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<RemoteReceiptPage, ClientError> {
        let page = self
            .client
            .get(self.url("/api/receipts"))
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteReceiptPage>()
            .await?;
        Ok(page)
    }

    async fn fetch_products(&self) -> Result<Vec<InventoryItem>, ClientError> {
        let products = self
            .client
            .get(self.url("/api/products"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<InventoryItem>>()
            .await?;
        Ok(products)
    }
}
