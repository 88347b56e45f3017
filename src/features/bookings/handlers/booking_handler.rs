use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireClient;
use crate::features::bookings::dtos::*;
use crate::features::bookings::policies::CancellationQuote;
use crate::features::bookings::services::{BookingService, CancelledBy};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Book a service
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateBookingDto,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Validation error or time in the past"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Client access required"),
        (status = 404, description = "Service, address or slot not found"),
        (status = 409, description = "Slot fully booked")
    ),
    tag = "bookings",
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    RequireClient(user): RequireClient,
    State(service): State<Arc<BookingService>>,
    AppJson(dto): AppJson<CreateBookingDto>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(booking),
            Some("Booking created successfully".to_string()),
            None,
        )),
    ))
}

/// List own bookings
#[utoipa::path(
    get,
    path = "/api/requests",
    params(BookingQueryParams, PaginationQuery),
    responses(
        (status = 200, description = "Bookings retrieved", body = ApiResponse<Vec<BookingResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Client access required")
    ),
    tag = "bookings",
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    RequireClient(user): RequireClient,
    State(service): State<Arc<BookingService>>,
    Query(filter): Query<BookingQueryParams>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<BookingResponseDto>>>> {
    let (items, total) = service
        .list(Some(&user.sub), filter.status, page.offset(), page.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get one of own bookings with its assignment and allowed actions
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking retrieved", body = ApiResponse<BookingDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings",
    security(("bearer_auth" = []))
)]
pub async fn get_booking(
    RequireClient(user): RequireClient,
    State(service): State<Arc<BookingService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let booking = service.get_for_client(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(Some(booking), None, None)))
}

/// Preview the fee and refund of cancelling now
#[utoipa::path(
    get,
    path = "/api/requests/{id}/cancellation-quote",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Quote computed", body = ApiResponse<CancellationQuote>),
        (status = 400, description = "Booking can no longer be cancelled"),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings",
    security(("bearer_auth" = []))
)]
pub async fn get_cancellation_quote(
    RequireClient(user): RequireClient,
    State(service): State<Arc<BookingService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CancellationQuote>>> {
    let quote = service.cancellation_quote(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(Some(quote), None, None)))
}

/// Cancel one of own bookings; a fee applies inside 24 hours
#[utoipa::path(
    post,
    path = "/api/requests/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBookingDto,
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Booking can no longer be cancelled"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Concurrent update")
    ),
    tag = "bookings",
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    RequireClient(user): RequireClient,
    State(service): State<Arc<BookingService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CancelBookingDto>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = service
        .cancel(id, &user.sub, CancelledBy::Client, dto.reason)
        .await?;

    let message = match booking.booking.cancellation_fee_cents {
        Some(fee) if !fee.is_zero() => format!("Booking cancelled, cancellation fee {}", fee),
        _ => "Booking cancelled".to_string(),
    };
    Ok(Json(ApiResponse::success(Some(booking), Some(message), None)))
}
