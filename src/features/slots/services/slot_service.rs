use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::slots::dtos::*;
use crate::features::slots::models::AvailableSlot;

const SLOT_COLUMNS: &str =
    "id, slot_date, start_time, end_time, capacity, booked_count, created_at";

/// Service for calendar slots
pub struct SlotService {
    pool: PgPool,
}

impl SlotService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Slots between two dates, inclusive
    pub async fn list(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<SlotResponseDto>> {
        let slots = sqlx::query_as::<_, AvailableSlot>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM available_slots
            WHERE slot_date BETWEEN $1 AND $2
            ORDER BY slot_date, start_time
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list slots: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(slots.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, dto: CreateSlotDto) -> Result<SlotResponseDto> {
        let slot = sqlx::query_as::<_, AvailableSlot>(&format!(
            r#"
            INSERT INTO available_slots (slot_date, start_time, end_time, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING {SLOT_COLUMNS}
            "#
        ))
        .bind(dto.slot_date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "A slot starting {} {} already exists",
                    dto.slot_date, dto.start_time
                ))
            } else {
                tracing::error!("Failed to create slot: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!(
            "Slot created: {} {}-{} (capacity {})",
            slot.slot_date,
            slot.start_time,
            slot.end_time,
            slot.capacity
        );
        Ok(slot.into())
    }

    /// Delete a slot that has no bookings
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM available_slots WHERE id = $1 AND booked_count = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM available_slots WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;

            return Err(if exists {
                AppError::Conflict("Slot has bookings and cannot be deleted".to_string())
            } else {
                AppError::NotFound("Slot not found".to_string())
            });
        }

        tracing::info!("Slot deleted: {}", id);
        Ok(())
    }
}

/// Take one place in a slot. Fails when the slot is full.
pub async fn reserve_slot(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<AvailableSlot> {
    let reserved = sqlx::query_as::<_, AvailableSlot>(&format!(
        r#"
        UPDATE available_slots
        SET booked_count = booked_count + 1
        WHERE id = $1 AND booked_count < capacity
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(slot) = reserved {
        return Ok(slot);
    }

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM available_slots WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;

    Err(if exists {
        AppError::Conflict("Selected slot is fully booked".to_string())
    } else {
        AppError::NotFound("Slot not found".to_string())
    })
}

/// Give back a place taken by [`reserve_slot`]
pub async fn release_slot(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE available_slots SET booked_count = booked_count - 1 \
         WHERE id = $1 AND booked_count > 0",
    )
    .bind(id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
