use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::{CreateReceiptPayload, PayloadItem, PosBackend};
use crate::error::PosError;
use crate::models::{
    CartLine, PaymentMethod, Receipt, ReceiptLine, ReceiptStatus, TAX_RATE, WALK_IN_CUSTOMER,
};
use crate::store::{InventoryStore, ReceiptHistory};

/// 购物车可变状态, 锁内访问
#[derive(Debug)]
struct CartState {
    lines: Vec<CartLine>,
    customer_name: String,
    payment_method: PaymentMethod,
}

impl CartState {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            customer_name: WALK_IN_CUSTOMER.to_string(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// 小票产出后才允许调用
    fn reset(&mut self) {
        self.lines.clear();
        self.customer_name = WALK_IN_CUSTOMER.to_string();
        self.payment_method = PaymentMethod::default();
    }

    fn line_quantity(&self, item_id: i64) -> u32 {
        self.lines
            .iter()
            .find(|l| l.item_id == item_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }
}

/// 购物车视图 (行 + 合计)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// 提交产出: 远端确认或本地留存, 两者都算业务成功
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub receipt: Receipt,
    pub committed: bool,
}

/// 购物车/小票引擎
///
/// 持有库存与历史的 Arc 句柄; 提交走远端后端, 失败则本地留存。
pub struct CartService {
    inventory: Arc<InventoryStore>,
    history: Arc<ReceiptHistory>,
    backend: Arc<dyn PosBackend>,
    store_id: Option<i64>,
    state: Mutex<CartState>,
    /// 在途标记, 挡住连点造成的重复提交
    submitting: AtomicBool,
}

impl CartService {
    pub fn new(
        inventory: Arc<InventoryStore>,
        history: Arc<ReceiptHistory>,
        backend: Arc<dyn PosBackend>,
        store_id: Option<i64>,
    ) -> Self {
        Self {
            inventory,
            history,
            backend,
            store_id,
            state: Mutex::new(CartState::new()),
            submitting: AtomicBool::new(false),
        }
    }

    /// 加购: 校验 在库 >= 车内已有 + 本次请求, 不满足则报差额且不动状态。
    /// 已有行则累加数量并刷新库存快照, 否则追加新行。
    pub async fn add_item(&self, item_id: i64, quantity: u32) -> Result<CartLine, PosError> {
        let quantity = quantity.max(1);
        let item = self
            .inventory
            .get(item_id)
            .await
            .ok_or(PosError::ItemNotFound(item_id))?;

        let mut state = self.state.lock().await;
        let in_cart = state.line_quantity(item_id);
        if in_cart + quantity > item.quantity {
            return Err(PosError::InsufficientStock {
                item_id,
                requested: quantity,
                max_addable: item.quantity.saturating_sub(in_cart),
            });
        }

        let line = if let Some(line) = state.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.quantity += quantity;
            line.stock_snapshot = item.quantity; // 刷新快照
            line.recompute_total();
            line.clone()
        } else {
            let mut line = CartLine {
                item_id,
                name: item.name.clone(),
                unit_price: item.price,
                quantity,
                line_total: 0.0,
                stock_snapshot: item.quantity,
            };
            line.recompute_total();
            state.lines.push(line.clone());
            line
        };

        tracing::info!(
            "已加入购物车: {} x{} (小计 {:.2})",
            line.name,
            line.quantity,
            line.line_total
        );
        Ok(line)
    }

    /// 改数量: <=0 等同删行; 只对行内库存快照校验, 不回查库存。
    /// 返回 None 表示该行已被移除。
    pub async fn update_line_quantity(
        &self,
        item_id: i64,
        new_quantity: i64,
    ) -> Result<Option<CartLine>, PosError> {
        if new_quantity <= 0 {
            self.remove_line(item_id).await;
            return Ok(None);
        }
        let new_quantity = new_quantity as u32;

        let mut state = self.state.lock().await;
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or(PosError::ItemNotFound(item_id))?;

        if new_quantity > line.stock_snapshot {
            return Err(PosError::InsufficientStock {
                item_id,
                requested: new_quantity,
                max_addable: line.stock_snapshot,
            });
        }

        line.quantity = new_quantity;
        line.recompute_total();
        Ok(Some(line.clone()))
    }

    /// 删行, 不存在则无事发生
    pub async fn remove_line(&self, item_id: i64) -> bool {
        let mut state = self.state.lock().await;
        let before = state.lines.len();
        state.lines.retain(|l| l.item_id != item_id);
        state.lines.len() != before
    }

    pub async fn set_customer_name(&self, name: &str) {
        let mut state = self.state.lock().await;
        let trimmed = name.trim();
        state.customer_name = if trimmed.is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            trimmed.to_string()
        };
    }

    pub async fn set_payment_method(&self, method: PaymentMethod) {
        self.state.lock().await.payment_method = method;
    }

    pub async fn subtotal(&self) -> f64 {
        let state = self.state.lock().await;
        Self::subtotal_of(&state.lines)
    }

    pub async fn view(&self) -> CartView {
        let state = self.state.lock().await;
        let subtotal = Self::subtotal_of(&state.lines);
        let tax = Self::tax_for(subtotal);
        CartView {
            lines: state.lines.clone(),
            customer_name: state.customer_name.clone(),
            payment_method: state.payment_method,
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    fn subtotal_of(lines: &[CartLine]) -> f64 {
        lines.iter().map(|l| l.line_total).sum()
    }

    pub fn tax_for(subtotal: f64) -> f64 {
        subtotal * TAX_RATE
    }

    /// 提交小票
    ///
    /// Phase 1: 在途标记, 连点直接驳回
    /// Phase 2: 锁内构造载荷与本地草稿, await 前放锁
    /// Phase 3: 远端创建; 成功则归一化入史并乐观扣库存, 失败则本地留存
    /// Phase 4: 只要产出了小票 (远端或本地) 就清空购物车
    pub async fn submit(&self) -> Result<SubmitOutcome, PosError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PosError::SubmissionInFlight);
        }

        let result = self.submit_inner().await;
        self.submitting.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self) -> Result<SubmitOutcome, PosError> {
        let (draft, payload) = {
            let state = self.state.lock().await;
            if state.lines.is_empty() {
                return Err(PosError::EmptyCart);
            }

            let subtotal = Self::subtotal_of(&state.lines);
            let tax = Self::tax_for(subtotal);
            let total = subtotal + tax;

            let payload = CreateReceiptPayload {
                items: state
                    .lines
                    .iter()
                    .map(|l| PayloadItem {
                        product_id: l.item_id,
                        quantity: l.quantity,
                    })
                    .collect(),
                payment_method: state.payment_method,
                customer_name: Some(state.customer_name.clone()),
                store_id: self.store_id,
                subtotal,
                tax,
                total,
            };

            let now = Utc::now();
            let draft = Receipt {
                receipt_number: format!("L-{}", now.timestamp_millis()),
                server_id: None,
                customer_name: state.customer_name.clone(),
                items: state
                    .lines
                    .iter()
                    .map(|l| ReceiptLine {
                        item_id: l.item_id,
                        name: l.name.clone(),
                        unit_price: l.unit_price,
                        quantity: l.quantity,
                        line_total: l.line_total,
                    })
                    .collect(),
                subtotal,
                tax,
                total,
                created_at: now,
                status: ReceiptStatus::LocallyPersisted,
                payment_method: state.payment_method,
            };
            (draft, payload)
        };

        let outcome = match self.backend.create_receipt(&payload).await {
            Ok(remote) => {
                // 乐观扣减, 与远端的差异留给下次库存刷新对齐
                for item in &payload.items {
                    self.inventory.decrement(item.product_id, item.quantity).await;
                }
                let receipt = remote.normalize(draft);
                tracing::info!(
                    "小票 {} 远端确认, 合计 {:.2}",
                    receipt.receipt_number,
                    receipt.total
                );
                SubmitOutcome {
                    receipt,
                    committed: true,
                }
            }
            Err(e) => {
                tracing::warn!("远端提交失败, 小票本地留存: {}", e);
                SubmitOutcome {
                    receipt: draft,
                    committed: false,
                }
            }
        };

        self.history.prepend(outcome.receipt.clone()).await;
        self.state.lock().await.reset();
        Ok(outcome)
    }
}
