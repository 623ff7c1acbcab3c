//! Emergency contact registration handlers

use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use crate::api::dto::{RegisterContactRequest, StatusResponse, UpdateRelationRequest};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::contacts::Contact;
use crate::error::AlertSrvError;

/// Register a new emergency contact
///
/// @route POST /registrations
/// @input ApiJson<RegisterContactRequest> - name and 11-digit phone
/// @output Json<Contact> - the stored contact with its id
pub async fn register_contact(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterContactRequest>,
) -> Result<Json<Contact>, AlertSrvError> {
    let contact = state.contacts.register(&req.name, &req.phone).await?;
    Ok(Json(contact))
}

/// List all contacts
///
/// @route GET /registrations
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Contact>>, AlertSrvError> {
    Ok(Json(state.contacts.list().await?))
}

/// Change the relation label of a contact
///
/// @route PUT /registrations/relation
pub async fn update_relation(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<UpdateRelationRequest>,
) -> Result<Json<Contact>, AlertSrvError> {
    let contact = state
        .contacts
        .update_relation(req.id, &req.relation)
        .await?;
    Ok(Json(contact))
}

/// Delete a contact
///
/// @route DELETE /registrations/{id}
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, AlertSrvError> {
    state.contacts.delete(id).await?;
    Ok(Json(StatusResponse::success(format!(
        "Contact {} deleted",
        id
    ))))
}
