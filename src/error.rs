use thiserror::Error;

/// 业务错误 - 全部可恢复, 由调用方提示用户
#[derive(Debug, Error, PartialEq)]
pub enum PosError {
    /// 库存不足: 返回还可加购的最大数量, 购物车状态不变
    #[error("insufficient stock for item {item_id}: requested {requested}, max addable {max_addable}")]
    InsufficientStock {
        item_id: i64,
        requested: u32,
        max_addable: u32,
    },

    #[error("cart is empty, nothing to submit")]
    EmptyCart,

    /// 防重复提交: 已有一笔提交在途
    #[error("a receipt submission is already in flight")]
    SubmissionInFlight,

    #[error("item {0} not found in inventory")]
    ItemNotFound(i64),

    /// OCR 输入为空文本
    #[error("no recognizable text in scan input")]
    NoRecognizableText,

    /// OCR 文本里没有解析出任何商品行
    #[error("no items could be extracted from scan text")]
    NoItemsExtracted,
}
