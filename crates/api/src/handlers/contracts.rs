//! Handlers for the `/contracts` resource.
//!
//! Every handler is scoped to the authenticated owner: another tenant's
//! contract id answers 404. Contract rows and their reminder rows are always
//! written in one transaction.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use dealping_core::contract::ContractInput;
use dealping_core::error::CoreError;
use dealping_core::extraction::{DocumentKind, ExtractedContract, MAX_UPLOAD_BYTES};
use dealping_core::lifecycle::{classify_status, effective_status, today_from};
use dealping_core::plans::check_contract_limit;
use dealping_core::reminders::{plan_reminders, ReminderType};
use dealping_core::types::{Date, DbId, Timestamp};
use dealping_db::models::contract::{Contract, ContractAttachment, NewContract};
use dealping_db::models::reminder::Reminder;
use dealping_db::repositories::{ContractRepo, ReminderRepo, SubscriptionRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A contract together with its reminder schedule.
#[derive(Debug, Serialize)]
pub struct ContractWithReminders {
    #[serde(flatten)]
    pub contract: Contract,
    pub reminders: Vec<Reminder>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Contract",
        id,
    })
}

async fn find_owned(state: &AppState, id: DbId, user_id: DbId) -> AppResult<Contract> {
    ContractRepo::find_for_user(&state.pool, id, user_id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Recompute the status and overwrite the stored snapshot if it drifted.
async fn refresh_status(state: &AppState, contract: Contract, today: Date) -> AppResult<Contract> {
    if contract.status_is_stale(today) {
        let status = contract.current_status(today);
        ContractRepo::update_status_snapshot(&state.pool, contract.id, status).await?;
        tracing::debug!(contract_id = contract.id, %status, "Refreshed status snapshot");
    }
    Ok(contract.with_current_status(today))
}

/// Reject the request if the owner's plan has no room for another contract.
async fn ensure_can_create(state: &AppState, user_id: DbId) -> AppResult<()> {
    let plan = SubscriptionRepo::active_plan(&state.pool, user_id).await?;
    let existing = ContractRepo::count_for_user(&state.pool, user_id).await?;
    check_contract_limit(plan, existing)?;
    Ok(())
}

/// Validate `input`, then insert the contract and its planned reminders in
/// one transaction.
async fn create_with_reminders(
    state: &AppState,
    user_id: DbId,
    input: ContractInput,
    attachment: Option<&ContractAttachment>,
    now: Timestamp,
) -> AppResult<ContractWithReminders> {
    let fields = input.validate()?;
    let today = today_from(now);
    let status = classify_status(fields.end_date, today);
    let schedule = plan_reminders(fields.end_date, today);

    let mut tx = state.pool.begin().await?;
    let contract = ContractRepo::create(
        &mut tx,
        &NewContract {
            user_id,
            fields: &fields,
            status,
            attachment,
        },
    )
    .await?;
    let planned = ReminderRepo::create_batch(
        &mut tx,
        contract.id,
        user_id,
        &schedule.dates,
        ReminderType::Renewal,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        contract_id = contract.id,
        user_id,
        %status,
        reminders = planned,
        "Contract created"
    );

    let reminders = ReminderRepo::list_for_contract(&state.pool, contract.id).await?;
    Ok(ContractWithReminders {
        contract,
        reminders,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/contracts
///
/// List the caller's contracts, soonest end date first, with status
/// recomputed for today.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Contract>>>> {
    let today = today_from(Utc::now());
    let contracts = ContractRepo::list_for_user(&state.pool, auth.user_id).await?;

    let mut refreshed = Vec::with_capacity(contracts.len());
    for contract in contracts {
        refreshed.push(refresh_status(&state, contract, today).await?);
    }
    Ok(Json(DataResponse { data: refreshed }))
}

/// POST /api/v1/contracts
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ContractInput>,
) -> AppResult<(StatusCode, Json<DataResponse<ContractWithReminders>>)> {
    ensure_can_create(&state, auth.user_id).await?;
    let created = create_with_reminders(&state, auth.user_id, input, None, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/contracts/upload
///
/// Accepts a multipart form with a required `file` field holding a PDF or
/// DOCX document. The file is stored, sent to the extraction service, and
/// the normalised result goes through the same path as a manual create.
/// The stored file is removed again if any later step fails.
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ContractWithReminders>>)> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("contract").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some((file_name, content_type, data.to_vec()));
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    let kind = DocumentKind::detect(content_type.as_deref(), &file_name).ok_or_else(|| {
        AppError::BadRequest("Unsupported file type. Upload a PDF or DOCX document.".into())
    })?;

    ensure_can_create(&state, auth.user_id).await?;

    let file_path = state
        .files
        .save(auth.user_id, &file_name, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let result = extract_and_create(&state, auth.user_id, &file_name, kind, data, &file_path).await;
    if result.is_err() {
        state.files.remove(&file_path).await;
    }
    let created = result?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

async fn extract_and_create(
    state: &AppState,
    user_id: DbId,
    file_name: &str,
    kind: DocumentKind,
    data: Vec<u8>,
    file_path: &str,
) -> AppResult<ContractWithReminders> {
    let raw = state.extractor.extract(file_name, kind, data).await?;
    let extracted: ExtractedContract = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::Upstream(format!("Unreadable extraction result: {e}")))?;

    let attachment = ContractAttachment {
        file_path: file_path.to_string(),
        file_name: file_name.to_string(),
        extracted_data: raw,
    };
    create_with_reminders(
        state,
        user_id,
        extracted.into_input(),
        Some(&attachment),
        Utc::now(),
    )
    .await
}

/// GET /api/v1/contracts/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ContractWithReminders>>> {
    let today = today_from(Utc::now());
    let contract = find_owned(&state, id, auth.user_id).await?;
    let contract = refresh_status(&state, contract, today).await?;
    let reminders = ReminderRepo::list_for_contract(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: ContractWithReminders {
            contract,
            reminders,
        },
    }))
}

/// PUT /api/v1/contracts/{id}
///
/// Partial update: fields absent from the body keep their stored value.
/// Changing `end_date` replaces the pending reminders with a fresh plan in
/// the same transaction; delivered reminders are kept.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<ContractInput>,
) -> AppResult<Json<DataResponse<ContractWithReminders>>> {
    let existing = find_owned(&state, id, auth.user_id).await?;
    let fields = existing.to_input().overlay(patch).validate()?;

    let today = today_from(Utc::now());
    let renewed = existing.renewed_at.is_some();
    let status = effective_status(fields.end_date, renewed, today);

    let mut tx = state.pool.begin().await?;
    let updated = ContractRepo::update(&mut tx, id, auth.user_id, &fields, status)
        .await?
        .ok_or_else(|| not_found(id))?;

    if fields.end_date != existing.end_date && !renewed {
        let schedule = plan_reminders(fields.end_date, today);
        let planned = ReminderRepo::replace_pending(
            &mut tx,
            id,
            auth.user_id,
            &schedule.dates,
            ReminderType::Renewal,
        )
        .await?;
        tracing::info!(contract_id = id, reminders = planned, "Reminders re-planned");
    }
    tx.commit().await?;

    let reminders = ReminderRepo::list_for_contract(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ContractWithReminders {
            contract: updated,
            reminders,
        },
    }))
}

/// POST /api/v1/contracts/{id}/renew
///
/// Marks the contract renewed and drops its pending reminders. Renewing
/// twice keeps the first renewal time.
pub async fn renew(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ContractWithReminders>>> {
    let mut tx = state.pool.begin().await?;
    let contract = ContractRepo::mark_renewed(&mut tx, id, auth.user_id, Utc::now())
        .await?
        .ok_or_else(|| not_found(id))?;
    let dropped = ReminderRepo::delete_pending(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(contract_id = id, dropped_reminders = dropped, "Contract renewed");

    let reminders = ReminderRepo::list_for_contract(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ContractWithReminders {
            contract,
            reminders,
        },
    }))
}

/// DELETE /api/v1/contracts/{id}
///
/// Removes the contract and all its reminders, then the stored document.
/// A failed file deletion is logged and does not fail the request.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_owned(&state, id, auth.user_id).await?;

    let mut tx = state.pool.begin().await?;
    ReminderRepo::delete_for_contract(&mut tx, id).await?;
    if !ContractRepo::delete(&mut tx, id, auth.user_id).await? {
        return Err(not_found(id));
    }
    tx.commit().await?;

    if let Some(path) = existing.file_path.as_deref() {
        state.files.remove(path).await;
    }

    tracing::info!(contract_id = id, "Contract deleted");
    Ok(StatusCode::NO_CONTENT)
}
