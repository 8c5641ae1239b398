//! OpenAPI Documentation
//!
//! OpenAPI 3.0 document for the cash card API, served by Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// Cash Card API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cash Card API",
        description = "Owner-scoped cash card records over HTTP Basic authentication.",
        version = "1.0.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Cash cards
        handlers::cash_card::get_cash_card,
        handlers::cash_card::list_cash_cards,
        handlers::cash_card::create_cash_card,
        handlers::cash_card::update_cash_card,
        handlers::cash_card::delete_cash_card,
    ),
    components(
        schemas(
            ErrorResponse,
            dto::PaginationParams,
            dto::HealthResponse,
            dto::ReadinessResponse,
            dto::CashCardRequest,
            dto::CashCardResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Cash Cards", description = "Cash card records of the authenticated owner")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Render the OpenAPI document as pretty JSON
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}
