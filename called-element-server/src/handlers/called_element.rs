//! Called-element endpoint:
//!   POST /calledelement: form-encoded parameters (as posted by the designer)
//!   GET  /calledelement: the same parameters in the query string
//!
//! The `action` parameter selects the mode; every mode answers with a flat
//! JSON object.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Query},
    Json,
};
use called_element_core::{CalledElementRequest, RequestParams};

use crate::config::ServerConfig;
use crate::error::AppError;

pub async fn post_called_element(
    Extension(config): Extension<Arc<ServerConfig>>,
    Form(params): Form<RequestParams>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    dispatch(&config, params).await
}

pub async fn get_called_element(
    Extension(config): Extension<Arc<ServerConfig>>,
    Query(params): Query<RequestParams>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    dispatch(&config, params).await
}

async fn dispatch(
    config: &ServerConfig,
    params: RequestParams,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let profile = config
        .profile(params.profile.as_deref())
        .ok_or_else(|| AppError::UnknownProfile(params.profile.clone().unwrap_or_default()))?;
    let request = CalledElementRequest::from_params(&params)?;
    let mode = request.mode();

    let response = profile.service().handle(request).await?;
    let mapping = response.into_mapping();
    tracing::info!(mode, entries = mapping.len(), "called-element request served");
    Ok(Json(mapping))
}
