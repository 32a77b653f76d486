use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{AssignCourierRequest, AssignmentResponse, ErrorResponse};
use crate::routes::AppState;
use crate::services::{assign_with_retry, AssignmentError, PostgresError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/orders/{order_id}/auto-assign-delivery-partner",
        web::post().to(auto_assign_delivery_partner),
    );
}

/// Map a failed assignment onto an HTTP error
fn assignment_error_response(error: &AssignmentError<PostgresError>) -> HttpResponse {
    match error {
        AssignmentError::NoneAvailable => HttpResponse::Conflict().json(ErrorResponse::new(
            "No delivery partner available",
            error.to_string(),
            409,
        )),
        AssignmentError::OrderAlreadyAssigned(_) => HttpResponse::Conflict().json(
            ErrorResponse::new("Order already assigned", error.to_string(), 409),
        ),
        AssignmentError::Exhausted(_) => HttpResponse::Conflict().json(ErrorResponse::new(
            "Delivery partners claimed concurrently",
            error.to_string(),
            409,
        )),
        AssignmentError::Store(e) => HttpResponse::InternalServerError().json(
            ErrorResponse::new("Failed to assign delivery partner", e.to_string(), 500),
        ),
    }
}

/// Auto-assign endpoint
///
/// POST /api/v1/orders/{orderId}/auto-assign-delivery-partner
///
/// Request body:
/// ```json
/// { "restaurantId": 42 }
/// ```
async fn auto_assign_delivery_partner(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<AssignCourierRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let order_id = path.into_inner();

    let restaurant = match state.postgres.fetch_restaurant(req.restaurant_id).await {
        Ok(Some(restaurant)) => restaurant,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new(
                "Restaurant not found",
                format!("No restaurant with id {}", req.restaurant_id),
                404,
            ));
        }
        Err(e) => {
            tracing::error!("Failed to load restaurant {}: {}", req.restaurant_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to load restaurant",
                e.to_string(),
                500,
            ));
        }
    };

    let pickup = restaurant.location.and_then(|l| l.point());
    if pickup.is_none() {
        tracing::warn!(
            "Restaurant {} has no usable location, ranking couriers by rating only",
            restaurant.id
        );
    }

    let couriers = match state.postgres.fetch_available_couriers().await {
        Ok(couriers) => couriers,
        Err(e) => {
            tracing::error!("Failed to load available couriers: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to load delivery partners",
                e.to_string(),
                500,
            ));
        }
    };

    tracing::info!(
        "Auto-assigning order {} from restaurant {} ({} available partners)",
        order_id,
        restaurant.id,
        couriers.len()
    );

    let postgres = state.postgres.as_ref();
    let result = assign_with_retry(
        &state.matcher,
        order_id,
        pickup.as_ref(),
        couriers,
        state.max_assignment_attempts,
        move |courier_id, score| postgres.commit_assignment(order_id, courier_id, score),
    )
    .await;

    match result {
        Ok(assignment) => HttpResponse::Ok().json(AssignmentResponse {
            order_id: assignment.order_id,
            courier: assignment.courier,
            score: assignment.score,
            assigned_at: assignment.assigned_at,
        }),
        Err(e) => {
            tracing::warn!("Auto-assignment for order {} failed: {}", order_id, e);
            assignment_error_response(&e)
        }
    }
}
