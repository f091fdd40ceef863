//! Handler for the `/top/:listing` id listings.

use std::sync::Arc;

use axum::{Json, extract::State};
use fakernews_core::{
  item::ItemId,
  listing::{Listing, Page},
  store::NewsStore,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{PathParams, QueryParams},
};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub limit:  Option<i64>,
  pub offset: Option<i64>,
}

/// `GET /top/{stories,comments,jobs,new}[?limit=..][&offset=..]`
pub async fn list<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(listing): PathParams<String>,
  QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Vec<ItemId>>, ApiError> {
  let listing: Listing = listing
    .parse()
    .map_err(|_| ApiError::NotFound(format!("no listing named {listing:?}")))?;
  let page = Page::new(params.limit, params.offset);

  let ids = store
    .list_items(listing, page)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ids))
}
