//! Catalog read endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::HeaderName,
    response::IntoResponse,
};
use bosanoga_core::{Category, CategoryId, CatalogQuery, Product, ProductId, ProductPreview};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Response header carrying the number of items matching a listing query.
pub static TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Raw query parameters of `GET /api/items`.
///
/// Kept as strings so that empty values (`?offset=`) read as defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsParams {
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    pub offset: Option<String>,
    pub q: Option<String>,
}

impl ItemsParams {
    /// Convert into a catalog query.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a non-integer `categoryId` or a non-integer or
    /// negative `offset`.
    pub fn into_query(self) -> Result<CatalogQuery> {
        let category_id = match non_empty(self.category_id.as_deref()) {
            None => CategoryId::ALL,
            Some(raw) => raw
                .parse::<i32>()
                .map(CategoryId::new)
                .map_err(|_| AppError::BadRequest(format!("Invalid categoryId: {raw}")))?,
        };
        let offset = match non_empty(self.offset.as_deref()) {
            None => 0,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| AppError::BadRequest(format!("Invalid offset: {raw}")))?,
        };

        Ok(CatalogQuery::new(
            category_id,
            self.q.as_deref().unwrap_or_default(),
            offset,
        ))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog().categories().to_vec())
}

/// `GET /api/top-sales`
#[instrument(skip(state))]
pub async fn top_sales(State(state): State<AppState>) -> Json<Vec<ProductPreview>> {
    Json(state.catalog().top_sales())
}

/// `GET /api/items?categoryId=&offset=&q=`
///
/// The body is a plain array of previews; the total match count travels in
/// the `X-Total-Count` header.
#[instrument(skip(state, params))]
pub async fn items(
    State(state): State<AppState>,
    params: std::result::Result<Query<ItemsParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = params.into_query()?;

    let page = state.catalog().query(&query);
    tracing::debug!(
        category = ?query.category(),
        search = query.search(),
        offset = query.offset(),
        returned = page.items.len(),
        total = page.total,
        "Catalog query"
    );

    Ok((
        [(TOTAL_COUNT_HEADER.clone(), page.total.to_string())],
        Json(page.items),
    ))
}

/// `GET /api/items/{id}`
///
/// Anything other than a run of ASCII digits is treated as an unknown id.
#[instrument(skip(state))]
pub async fn item(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = parse_product_id(&id).ok_or(AppError::NotFound)?;

    let product = state.catalog().product(id).ok_or(AppError::NotFound)?;
    add_breadcrumb("catalog", "Viewed product", &[("product_id", id.to_string())]);

    Ok(Json(product.clone()))
}

fn parse_product_id(raw: &str) -> Option<ProductId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().map(ProductId::new)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::*;
    use crate::routes::test_support::{get, test_app};

    fn ids(body: &Value) -> Vec<i64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_params_defaults() {
        let query = ItemsParams {
            category_id: Some(String::new()),
            offset: Some(" ".to_string()),
            q: None,
        }
        .into_query()
        .unwrap();
        assert_eq!(query, CatalogQuery::all());
    }

    #[test]
    fn test_params_invalid() {
        let bad_category = ItemsParams {
            category_id: Some("shoes".to_string()),
            ..ItemsParams::default()
        };
        assert!(matches!(
            bad_category.into_query(),
            Err(AppError::BadRequest(_))
        ));

        let negative_offset = ItemsParams {
            offset: Some("-6".to_string()),
            ..ItemsParams::default()
        };
        assert!(negative_offset.into_query().is_err());
    }

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("66"), Some(ProductId::new(66)));
        assert_eq!(parse_product_id("+66"), None);
        assert_eq!(parse_product_id("-1"), None);
        assert_eq!(parse_product_id("abc"), None);
        assert_eq!(parse_product_id("99999999999"), None);
    }

    #[tokio::test]
    async fn test_categories() {
        let (status, _, body) = get(test_app(), "/api/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"id": 1, "title": "Boots"}, {"id": 2, "title": "Sneakers"}])
        );
    }

    #[tokio::test]
    async fn test_top_sales_source_order() {
        let (status, _, body) = get(test_app(), "/api/top-sales").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), [65, 66, 73]);
        assert!(body[0].get("sizes").is_none());
    }

    #[tokio::test]
    async fn test_items_filter_and_total_header() {
        let (status, headers, body) = get(test_app(), "/api/items?categoryId=1&q=red").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), [10]);
        assert_eq!(headers[&TOTAL_COUNT_HEADER], "1");

        let (_, headers, body) = get(test_app(), "/api/items?categoryId=2&q=red").await;
        assert_eq!(body, json!([]));
        assert_eq!(headers[&TOTAL_COUNT_HEADER], "0");
    }

    #[tokio::test]
    async fn test_items_pagination() {
        let (_, headers, first) = get(test_app(), "/api/items").await;
        let (_, _, second) = get(test_app(), "/api/items?offset=6").await;

        assert_eq!(ids(&first), [10, 11, 12, 13, 14, 15]);
        assert_eq!(ids(&second), [65, 66, 73]);
        assert_eq!(headers[&TOTAL_COUNT_HEADER], "9");
    }

    #[tokio::test]
    async fn test_items_bad_params() {
        let (status, _, body) = get(test_app(), "/api/items?offset=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid offset: abc");
    }

    #[tokio::test]
    async fn test_item_found_and_missing() {
        let (status, _, body) = get(test_app(), "/api/items/10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Red Boots");
        assert_eq!(body["sizes"][0]["size"], "42");

        let (status, _, body) = get(test_app(), "/api/items/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));

        let (status, _, _) = get(test_app(), "/api/items/ten").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
