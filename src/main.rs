use axum::{
    routing::{get, post, put},
    Router,
};
use pos_checkout_rust::{
    api, AppConfig, CartService, HttpBackend, InventoryStore, MatchEngine, PosBackend,
    ReceiptHistory, ScanService,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 远端后端与两个容器
    let backend: Arc<dyn PosBackend> = Arc::new(HttpBackend::new(config.backend.base_url.clone()));
    let inventory = Arc::new(InventoryStore::new());
    let history = Arc::new(ReceiptHistory::new());

    // 启动时拉一次库存, 拉不到就空库存起步
    match backend.fetch_products().await {
        Ok(products) => {
            info!("Loaded {} products from backend", products.len());
            inventory.replace_all(products).await;
        }
        Err(e) => tracing::warn!("初始库存拉取失败, 以空库存启动: {}", e),
    }

    // 两个引擎
    let cart = Arc::new(CartService::new(
        inventory.clone(),
        history.clone(),
        backend.clone(),
        config.backend.store_id,
    ));
    let scan = Arc::new(ScanService::new(
        MatchEngine::new(config.matching.clone()),
        inventory.clone(),
        cart.clone(),
    ));

    // 构建路由
    // 购物车/提交
    let cart_routes = Router::new()
        .route("/api/cart", get(api::get_cart))
        .route("/api/cart/items", post(api::add_cart_item))
        .route(
            "/api/cart/items/:id",
            put(api::update_cart_item).delete(api::remove_cart_item),
        )
        .route("/api/cart/checkout", put(api::update_checkout))
        .route("/api/receipts/submit", post(api::submit_receipt))
        .with_state(cart);

    // 扫描匹配
    let scan_routes = Router::new()
        .route("/api/scan/receipt", post(api::scan_receipt))
        .with_state(scan);

    // 库存
    let inventory_routes = Router::new()
        .route("/api/inventory", get(api::list_inventory))
        .route("/api/inventory/barcode/:code", get(api::barcode_lookup))
        .route("/api/inventory/refresh", post(api::refresh_inventory))
        .with_state(api::InventoryApiState {
            store: inventory,
            backend: backend.clone(),
        });

    // 小票历史
    let receipt_routes = Router::new()
        .route("/api/receipts", get(api::list_receipts))
        .route("/api/receipts/remote", get(api::list_remote_receipts))
        .with_state(api::ReceiptApiState { history, backend });

    // 合并路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(cart_routes)
        .merge(scan_routes)
        .merge(inventory_routes)
        .merge(receipt_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET    /api/cart                    - Cart view");
    info!("  POST   /api/cart/items              - Add item to cart");
    info!("  PUT    /api/cart/items/:id          - Update line quantity");
    info!("  DELETE /api/cart/items/:id          - Remove line");
    info!("  PUT    /api/cart/checkout           - Customer / payment method");
    info!("  POST   /api/receipts/submit         - Submit receipt");
    info!("  GET    /api/receipts                - Local receipt history");
    info!("  GET    /api/receipts/remote         - Remote receipt listing");
    info!("  POST   /api/scan/receipt            - OCR text -> cart");
    info!("  GET    /api/inventory               - Inventory listing");
    info!("  GET    /api/inventory/barcode/:code - Barcode lookup");
    info!("  POST   /api/inventory/refresh       - Pull products from backend");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
