//! Order API Handlers

use axum::{
    Json,
    extract::{OriginalUri, Query, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::links::{remove_query_param, replace_query_param, replace_query_params};
use crate::core::ServerState;
use crate::pagination::{PageNumber, PageRequest, QuerySignature};
use crate::store::ORDERS_RESOURCE;
use shared::error::AppResult;
use shared::models::Order;
use shared::request::{LimitOffsetQuery, OrderListQuery, PageQuery};
use shared::response::{PageResponse, WindowResponse};

/// Order list item
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    order: Order,
    final_price: Option<Decimal>,
    status_name: &'static str,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            final_price: order.final_price(),
            status_name: order.status_name(),
            order,
        }
    }
}

/// Query signature of the order list, newest first unless the client orders it
fn signature(filters: &OrderListQuery) -> QuerySignature {
    let mut sig = QuerySignature::new(ORDERS_RESOURCE);
    for (field, value) in filters.filters() {
        sig = sig.filter(field, value);
    }
    let ordering = filters.ordering();
    if ordering.is_empty() {
        return sig.order_by("-id");
    }
    ordering
        .into_iter()
        .fold(sig, |sig, field| sig.order_by(field))
}

/// GET /api/orders - page-number list
pub async fn list(
    State(state): State<ServerState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageQuery>,
    Query(filters): Query<OrderListQuery>,
) -> AppResult<Json<PageResponse<OrderView>>> {
    let request = PageRequest {
        number: PageNumber::parse(page.page_text())?,
        page_size: page.page_size(state.config.page_size, state.config.max_page_size),
        show_count: page.show_count(),
    };
    let page = state.pages.paginate(&signature(&filters), request).await?;

    let next = page
        .next_page_number()
        .map(|n| replace_query_param(&uri, "page", n));
    let previous = page.previous_page_number().map(|n| {
        if n == 1 {
            remove_query_param(&uri, "page", None)
        } else {
            replace_query_param(&uri, "page", n)
        }
    });

    Ok(Json(PageResponse {
        count: page.count,
        current_page: page.number as usize,
        next,
        previous,
        results: page.items.into_iter().map(OrderView::from).collect(),
    }))
}

/// GET /api/orders/offset - limit/offset list
pub async fn list_window(
    State(state): State<ServerState>,
    OriginalUri(uri): OriginalUri,
    Query(window): Query<LimitOffsetQuery>,
    Query(filters): Query<OrderListQuery>,
) -> AppResult<Json<WindowResponse<OrderView>>> {
    let limit = window.limit(state.config.page_size, state.config.max_page_size);
    let offset = window.offset();
    let window = state
        .windows
        .paginate(&signature(&filters), limit, offset)
        .await?;

    let next = window
        .next_offset()
        .map(|o| replace_query_params(&uri, ("limit", limit), ("offset", o)));
    let previous = window.previous_offset().map(|o| {
        if o == 0 {
            remove_query_param(&uri, "offset", Some(("limit", limit.to_string())))
        } else {
            replace_query_params(&uri, ("limit", limit), ("offset", o))
        }
    });

    Ok(Json(WindowResponse {
        count: window.count,
        next,
        previous,
        results: window.items.into_iter().map(OrderView::from).collect(),
    }))
}
