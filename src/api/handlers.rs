use crate::client::PosBackend;
use crate::error::PosError;
use crate::models::{CartLine, InventoryItem, PaymentMethod, ReceiptWire};
use crate::service::{CartService, CartView, ScanOutcome, ScanService};
use crate::store::{InventoryStore, ReceiptHistory};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 库存路由状态
#[derive(Clone)]
pub struct InventoryApiState {
    pub store: Arc<InventoryStore>,
    pub backend: Arc<dyn PosBackend>,
}

/// 小票历史路由状态
#[derive(Clone)]
pub struct ReceiptApiState {
    pub history: Arc<ReceiptHistory>,
    pub backend: Arc<dyn PosBackend>,
}

/// 通用失败响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

fn error_status(err: &PosError) -> StatusCode {
    match err {
        PosError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        PosError::InsufficientStock { .. } | PosError::SubmissionInFlight => StatusCode::CONFLICT,
        PosError::EmptyCart | PosError::NoRecognizableText | PosError::NoItemsExtracted => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn error_response(err: PosError) -> Response {
    (
        error_status(&err),
        Json(ErrorResponse {
            success: false,
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

// ---------------------------------------------------------------------------
// 购物车
// ---------------------------------------------------------------------------

/// 请求体: 加购
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// 请求体: 改数量 (<=0 即删行)
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// 请求体: 收银台信息
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// 响应体: 购物车行操作
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub success: bool,
    pub message: String,
    pub line: Option<CartLine>,
}

pub async fn get_cart(State(cart): State<Arc<CartService>>) -> Json<CartView> {
    Json(cart.view().await)
}

pub async fn add_cart_item(
    State(cart): State<Arc<CartService>>,
    Json(req): Json<AddItemRequest>,
) -> Response {
    match cart.add_item(req.product_id, req.quantity.unwrap_or(1)).await {
        Ok(line) => {
            let response = CartLineResponse {
                success: true,
                message: format!("{} x{} added to cart", line.name, line.quantity),
                line: Some(line),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn update_cart_item(
    State(cart): State<Arc<CartService>>,
    Path(item_id): Path<i64>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Response {
    match cart.update_line_quantity(item_id, req.quantity).await {
        Ok(Some(line)) => {
            let response = CartLineResponse {
                success: true,
                message: format!("{} quantity set to {}", line.name, line.quantity),
                line: Some(line),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => {
            let response = CartLineResponse {
                success: true,
                message: format!("Line {} removed", item_id),
                line: None,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn remove_cart_item(
    State(cart): State<Arc<CartService>>,
    Path(item_id): Path<i64>,
) -> Response {
    let removed = cart.remove_line(item_id).await;
    let response = CartLineResponse {
        success: true,
        message: if removed {
            format!("Line {} removed", item_id)
        } else {
            format!("Line {} was not in the cart", item_id)
        },
        line: None,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn update_checkout(
    State(cart): State<Arc<CartService>>,
    Json(req): Json<CheckoutRequest>,
) -> Json<CartView> {
    if let Some(name) = req.customer_name.as_deref() {
        cart.set_customer_name(name).await;
    }
    if let Some(method) = req.payment_method {
        cart.set_payment_method(method).await;
    }
    Json(cart.view().await)
}

// ---------------------------------------------------------------------------
// 小票
// ---------------------------------------------------------------------------

/// 响应体: 提交结果 (远端确认或本地留存都算成功)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub committed: bool,
    pub message: String,
    pub receipt: Option<ReceiptWire>,
}

pub async fn submit_receipt(State(cart): State<Arc<CartService>>) -> Response {
    match cart.submit().await {
        Ok(outcome) => {
            let message = if outcome.committed {
                format!("Receipt {} committed", outcome.receipt.receipt_number)
            } else {
                // 远端不可达, 告知用户交易已本地保存
                format!(
                    "Backend unreachable, receipt {} saved locally",
                    outcome.receipt.receipt_number
                )
            };
            let response = SubmitResponse {
                success: true,
                committed: outcome.committed,
                message,
                receipt: Some(ReceiptWire::from(&outcome.receipt)),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

/// 响应体: 小票分页
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPageResponse {
    pub receipts: Vec<ReceiptWire>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

pub async fn list_receipts(
    State(state): State<ReceiptApiState>,
    Query(query): Query<PageQuery>,
) -> Json<ReceiptPageResponse> {
    let page = state.history.page(query.page, query.page_size).await;
    Json(ReceiptPageResponse {
        receipts: page.receipts.iter().map(ReceiptWire::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    })
}

/// 远端小票列表直通, 出边界时归一化两套历史字段名
pub async fn list_remote_receipts(
    State(state): State<ReceiptApiState>,
    Query(query): Query<PageQuery>,
) -> Response {
    match state
        .backend
        .list_receipts(query.page as u32, query.page_size as u32)
        .await
    {
        Ok(remote) => {
            let total = remote.total.unwrap_or(remote.receipts.len() as i64);
            let receipts: Vec<ReceiptWire> = remote
                .receipts
                .into_iter()
                .map(|r| ReceiptWire::from(&r.normalize_bare()))
                .collect();
            let response = ReceiptPageResponse {
                receipts,
                total: total.max(0) as usize,
                page: remote.page.unwrap_or(query.page as i64) as usize,
                page_size: remote.page_size.unwrap_or(query.page_size as i64) as usize,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = ErrorResponse {
                success: false,
                message: format!("Error: {}", e),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// 库存
// ---------------------------------------------------------------------------

pub async fn list_inventory(State(state): State<InventoryApiState>) -> Json<Vec<InventoryItem>> {
    Json(state.store.list().await)
}

/// 扫码回调: 按解码串查库存, 查不到 404
pub async fn barcode_lookup(
    State(state): State<InventoryApiState>,
    Path(code): Path<String>,
) -> Response {
    match state.store.find_by_barcode(&code).await {
        Some(item) => (StatusCode::OK, Json(item)).into_response(),
        None => {
            let response = ErrorResponse {
                success: false,
                message: format!("no item matches barcode {}", code),
            };
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
    }
}

/// 响应体: 库存刷新
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

pub async fn refresh_inventory(State(state): State<InventoryApiState>) -> Response {
    match state.backend.fetch_products().await {
        Ok(products) => {
            let count = products.len();
            state.store.replace_all(products).await;
            tracing::info!("库存刷新完成: {} 个商品", count);
            let response = RefreshResponse {
                success: true,
                message: format!("Refreshed {} products", count),
                count,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = RefreshResponse {
                success: false,
                message: format!("Error: {}", e),
                count: 0,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// 扫描
// ---------------------------------------------------------------------------

/// 请求体: OCR 服务的文本产出 (本核心只消费文本)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTextRequest {
    pub extracted_text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub detected_language: Option<String>,
}

/// 响应体: 扫描匹配结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    pub outcome: Option<ScanOutcome>,
}

pub async fn scan_receipt(
    State(scan): State<Arc<ScanService>>,
    Json(req): Json<ScanTextRequest>,
) -> Response {
    if let Some(confidence) = req.confidence {
        tracing::debug!(
            "OCR 输入: confidence={:.2}, language={:?}",
            confidence,
            req.detected_language
        );
    }

    match scan.process_scan(&req.extracted_text).await {
        Ok(outcome) => {
            let response = ScanResponse {
                success: true,
                message: format!(
                    "{} added, {} failed, {} need confirmation, {} unmatched",
                    outcome.added.len(),
                    outcome.failed.len(),
                    outcome.partial_matches.len(),
                    outcome.unmatched_items.len()
                ),
                outcome: Some(outcome),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}
